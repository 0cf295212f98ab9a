use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{IdeogramError, Result};
use crate::models::ModelId;

pub const MIN_IMAGES: u8 = 1;
pub const MAX_IMAGES: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "ASPECT_1_1")]
    Aspect1x1,
    #[serde(rename = "ASPECT_4_3")]
    Aspect4x3,
    #[serde(rename = "ASPECT_3_4")]
    Aspect3x4,
    #[serde(rename = "ASPECT_16_9")]
    Aspect16x9,
    #[serde(rename = "ASPECT_9_16")]
    Aspect9x16,
    #[serde(rename = "ASPECT_3_2")]
    Aspect3x2,
    #[serde(rename = "ASPECT_2_3")]
    Aspect2x3,
    #[serde(rename = "ASPECT_16_10")]
    Aspect16x10,
    #[serde(rename = "ASPECT_10_16")]
    Aspect10x16,
    #[serde(rename = "ASPECT_3_1")]
    Aspect3x1,
    #[serde(rename = "ASPECT_1_3")]
    Aspect1x3,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 11] = [
        AspectRatio::Aspect1x1,
        AspectRatio::Aspect4x3,
        AspectRatio::Aspect3x4,
        AspectRatio::Aspect16x9,
        AspectRatio::Aspect9x16,
        AspectRatio::Aspect3x2,
        AspectRatio::Aspect2x3,
        AspectRatio::Aspect16x10,
        AspectRatio::Aspect10x16,
        AspectRatio::Aspect3x1,
        AspectRatio::Aspect1x3,
    ];

    fn dims(&self) -> (u8, u8) {
        match self {
            AspectRatio::Aspect1x1 => (1, 1),
            AspectRatio::Aspect4x3 => (4, 3),
            AspectRatio::Aspect3x4 => (3, 4),
            AspectRatio::Aspect16x9 => (16, 9),
            AspectRatio::Aspect9x16 => (9, 16),
            AspectRatio::Aspect3x2 => (3, 2),
            AspectRatio::Aspect2x3 => (2, 3),
            AspectRatio::Aspect16x10 => (16, 10),
            AspectRatio::Aspect10x16 => (10, 16),
            AspectRatio::Aspect3x1 => (3, 1),
            AspectRatio::Aspect1x3 => (1, 3),
        }
    }

    pub fn legacy_token(&self) -> String {
        let (width, height) = self.dims();
        format!("ASPECT_{width}_{height}")
    }

    pub fn v3_token(&self) -> String {
        let (width, height) = self.dims();
        format!("{width}x{height}")
    }

    /// Accepts either token style.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|ratio| {
            ratio.legacy_token() == normalized
                || ratio.v3_token().to_ascii_uppercase() == normalized
        })
    }
}

/// Speed/quality trade-off. Only the v3 endpoint honours it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderingSpeed {
    Turbo,
    Default,
    Quality,
}

impl RenderingSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderingSpeed::Turbo => "TURBO",
            RenderingSpeed::Default => "DEFAULT",
            RenderingSpeed::Quality => "QUALITY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TURBO" => Some(RenderingSpeed::Turbo),
            "DEFAULT" => Some(RenderingSpeed::Default),
            "QUALITY" => Some(RenderingSpeed::Quality),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MagicPromptOption {
    Auto,
    On,
    Off,
}

impl MagicPromptOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            MagicPromptOption::Auto => "AUTO",
            MagicPromptOption::On => "ON",
            MagicPromptOption::Off => "OFF",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Some(MagicPromptOption::Auto),
            "ON" => Some(MagicPromptOption::On),
            "OFF" => Some(MagicPromptOption::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteMember {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorPalette {
    Named { name: String },
    Members { members: Vec<PaletteMember> },
}

impl ColorPalette {
    fn is_usable(&self) -> bool {
        match self {
            ColorPalette::Named { name } => !name.trim().is_empty(),
            ColorPalette::Members { members } => {
                !members.is_empty() && members.iter().all(|m| !m.color.trim().is_empty())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendering_speed: Option<RenderingSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_prompt_option: Option<MagicPromptOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_images: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<ColorPalette>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: None,
            model: None,
            rendering_speed: None,
            magic_prompt_option: None,
            seed: None,
            style_type: None,
            negative_prompt: None,
            num_images: None,
            resolution: None,
            color_palette: None,
        }
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_num_images(mut self, num_images: u8) -> Self {
        self.num_images = Some(num_images);
        self
    }

    pub fn with_color_palette(mut self, palette: ColorPalette) -> Self {
        self.color_palette = Some(palette);
        self
    }

    pub fn with_rendering_speed(mut self, speed: RenderingSpeed) -> Self {
        self.rendering_speed = Some(speed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(IdeogramError::input("prompt must not be empty"));
        }
        if let Some(count) = self.num_images {
            if !(MIN_IMAGES..=MAX_IMAGES).contains(&count) {
                return Err(IdeogramError::input(format!(
                    "num_images must be between {MIN_IMAGES} and {MAX_IMAGES}, got {count}"
                )));
            }
        }
        Ok(())
    }

    /// Builds a request from loosely typed tool arguments.
    ///
    /// Only `prompt` is strict. Optional fields with the wrong type or an
    /// unknown value are treated as absent.
    pub fn from_arguments(arguments: Option<&Value>) -> Result<Self> {
        let empty = Map::new();
        let args = arguments.and_then(Value::as_object).unwrap_or(&empty);
        let prompt = args
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or_else(|| IdeogramError::input("Prompt is required and must be a string"))?;
        if prompt.trim().is_empty() {
            return Err(IdeogramError::input("Prompt is required and must be a string"));
        }

        Ok(Self {
            prompt: prompt.to_string(),
            aspect_ratio: str_arg(args, "aspect_ratio").and_then(AspectRatio::parse),
            model: str_arg(args, "model").and_then(ModelId::parse),
            rendering_speed: str_arg(args, "rendering_speed").and_then(RenderingSpeed::parse),
            magic_prompt_option: str_arg(args, "magic_prompt_option")
                .and_then(MagicPromptOption::parse),
            seed: args.get("seed").and_then(Value::as_u64),
            style_type: non_empty_string_arg(args, "style_type"),
            negative_prompt: non_empty_string_arg(args, "negative_prompt"),
            num_images: args.get("num_images").and_then(image_count),
            resolution: non_empty_string_arg(args, "resolution"),
            color_palette: args
                .get("color_palette")
                .and_then(|value| serde_json::from_value::<ColorPalette>(value.clone()).ok())
                .filter(ColorPalette::is_usable),
        })
    }
}

fn str_arg<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn non_empty_string_arg(args: &Map<String, Value>, key: &str) -> Option<String> {
    str_arg(args, key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn image_count(value: &Value) -> Option<u8> {
    let count = value.as_f64()?;
    if count.fract() != 0.0 || count < f64::from(MIN_IMAGES) || count > f64::from(MAX_IMAGES) {
        return None;
    }
    Some(count as u8)
}
