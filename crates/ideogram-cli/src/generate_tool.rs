use ideogram_contracts::models::ModelId;
use ideogram_contracts::request::{
    AspectRatio, GenerationRequest, MagicPromptOption, RenderingSpeed, MAX_IMAGES, MIN_IMAGES,
};
use ideogram_contracts::tools::{Tool, ToolError};
use ideogram_engine::IdeogramClient;
use serde_json::{json, Value};
use tracing::{info, warn};

pub const GENERATE_IMAGE_TOOL: &str = "generate_image";

pub struct GenerateImageTool {
    client: IdeogramClient,
}

impl GenerateImageTool {
    pub fn new(client: IdeogramClient) -> Self {
        Self { client }
    }
}

impl Tool for GenerateImageTool {
    fn name(&self) -> &str {
        GENERATE_IMAGE_TOOL
    }

    fn description(&self) -> &str {
        "Generate an image using Ideogram AI"
    }

    fn input_schema(&self) -> Value {
        let aspect_ratios = AspectRatio::ALL
            .iter()
            .map(AspectRatio::legacy_token)
            .collect::<Vec<String>>();
        let models = ModelId::ALL
            .iter()
            .map(ModelId::as_str)
            .collect::<Vec<&str>>();
        let magic_prompt = [
            MagicPromptOption::Auto,
            MagicPromptOption::On,
            MagicPromptOption::Off,
        ]
        .iter()
        .map(MagicPromptOption::as_str)
        .collect::<Vec<&str>>();
        let speeds = [
            RenderingSpeed::Turbo,
            RenderingSpeed::Default,
            RenderingSpeed::Quality,
        ]
        .iter()
        .map(RenderingSpeed::as_str)
        .collect::<Vec<&str>>();

        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The prompt to use for generating the image",
                },
                "aspect_ratio": {
                    "type": "string",
                    "description": "The aspect ratio for the generated image",
                    "enum": aspect_ratios,
                },
                "model": {
                    "type": "string",
                    "description": "The model to use for generation",
                    "enum": models,
                },
                "magic_prompt_option": {
                    "type": "string",
                    "description": "Whether to use magic prompt",
                    "enum": magic_prompt,
                },
                "rendering_speed": {
                    "type": "string",
                    "description": "Rendering speed, V_3 only",
                    "enum": speeds,
                },
                "style_type": {
                    "type": "string",
                    "description": "The style type for generation",
                },
                "negative_prompt": {
                    "type": "string",
                    "description": "Description of what to exclude from the image",
                },
                "num_images": {
                    "type": "number",
                    "description": format!("Number of images to generate ({MIN_IMAGES}-{MAX_IMAGES})"),
                    "minimum": MIN_IMAGES,
                    "maximum": MAX_IMAGES,
                },
                "seed": {
                    "type": "integer",
                    "description": "Random seed for reproducible generation",
                    "minimum": 0,
                },
                "resolution": {
                    "type": "string",
                    "description": "Explicit output resolution, e.g. 1024x1024",
                },
                "color_palette": {
                    "type": "object",
                    "description": "Preset palette name or weighted color members",
                    "properties": {
                        "name": { "type": "string" },
                        "members": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "color": { "type": "string" },
                                    "weight": { "type": "number" },
                                },
                                "required": ["color"],
                            },
                        },
                    },
                },
            },
            "required": ["prompt"],
        })
    }

    fn call(&self, arguments: Option<&Value>) -> Result<String, ToolError> {
        let request = GenerationRequest::from_arguments(arguments)?;
        let response = self.client.generate(&request).map_err(|err| {
            warn!(error = %err, "generate_image failed");
            ToolError::from(err)
        })?;
        info!(count = response.data.len(), "generate_image succeeded");
        Ok(response.summary())
    }
}
