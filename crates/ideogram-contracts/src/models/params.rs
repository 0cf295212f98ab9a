use super::catalog::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestParam {
    Prompt,
    AspectRatio,
    Model,
    RenderingSpeed,
    MagicPrompt,
    Seed,
    StyleType,
    NegativePrompt,
    NumImages,
    Resolution,
    ColorPalette,
}

impl RequestParam {
    pub fn json_key(&self) -> &'static str {
        match self {
            RequestParam::Prompt => "prompt",
            RequestParam::AspectRatio => "aspect_ratio",
            RequestParam::Model => "model",
            RequestParam::RenderingSpeed => "rendering_speed",
            RequestParam::MagicPrompt => "magic_prompt_option",
            RequestParam::Seed => "seed",
            RequestParam::StyleType => "style_type",
            RequestParam::NegativePrompt => "negative_prompt",
            RequestParam::NumImages => "num_images",
            RequestParam::Resolution => "resolution",
            RequestParam::ColorPalette => "color_palette",
        }
    }

    pub fn form_key(&self) -> &'static str {
        match self {
            RequestParam::MagicPrompt => "magic_prompt",
            other => other.json_key(),
        }
    }
}

const LEGACY_ENDPOINT: &[RequestParam] = &[RequestParam::RenderingSpeed];
const LEGACY_WITHOUT_PALETTE: &[RequestParam] =
    &[RequestParam::RenderingSpeed, RequestParam::ColorPalette];
// The v3 endpoint is model-specific, so the model itself is never sent.
const V3_ENDPOINT: &[RequestParam] = &[RequestParam::Model];

static PARAM_EXCLUSIONS: &[(ModelId, &[RequestParam])] = &[
    (ModelId::V1, LEGACY_WITHOUT_PALETTE),
    (ModelId::V1Turbo, LEGACY_WITHOUT_PALETTE),
    (ModelId::V2, LEGACY_ENDPOINT),
    (ModelId::V2Turbo, LEGACY_ENDPOINT),
    (ModelId::V2a, LEGACY_WITHOUT_PALETTE),
    (ModelId::V2aTurbo, LEGACY_WITHOUT_PALETTE),
    (ModelId::V3, V3_ENDPOINT),
];

/// Parameters stripped before a request for `model` leaves the process.
pub fn excluded_params(model: Option<ModelId>) -> &'static [RequestParam] {
    let Some(model) = model else {
        return LEGACY_ENDPOINT;
    };
    PARAM_EXCLUSIONS
        .iter()
        .find(|(candidate, _)| *candidate == model)
        .map(|(_, excluded)| *excluded)
        .unwrap_or(LEGACY_ENDPOINT)
}

pub fn supports_param(model: Option<ModelId>, param: RequestParam) -> bool {
    !excluded_params(model).contains(&param)
}

#[cfg(test)]
mod tests {
    use super::{excluded_params, supports_param, RequestParam, PARAM_EXCLUSIONS};
    use crate::models::{ModelFamily, ModelId};

    #[test]
    fn every_model_has_an_exclusion_entry() {
        for model in ModelId::ALL {
            assert!(
                PARAM_EXCLUSIONS.iter().any(|(entry, _)| *entry == model),
                "missing entry for {}",
                model.as_str()
            );
        }
    }

    #[test]
    fn rendering_speed_only_survives_on_v3() {
        for model in ModelId::ALL {
            let supported = supports_param(Some(model), RequestParam::RenderingSpeed);
            assert_eq!(supported, model.family() == ModelFamily::V3, "{}", model.as_str());
        }
        assert!(!supports_param(None, RequestParam::RenderingSpeed));
    }

    #[test]
    fn palette_dropped_for_v1_and_v2a_variants() {
        let unsupported = [
            ModelId::V1,
            ModelId::V1Turbo,
            ModelId::V2a,
            ModelId::V2aTurbo,
        ];
        for model in ModelId::ALL {
            let supported = supports_param(Some(model), RequestParam::ColorPalette);
            assert_eq!(supported, !unsupported.contains(&model), "{}", model.as_str());
        }
        assert!(supports_param(None, RequestParam::ColorPalette));
    }

    #[test]
    fn magic_prompt_key_differs_between_encodings() {
        assert_eq!(RequestParam::MagicPrompt.json_key(), "magic_prompt_option");
        assert_eq!(RequestParam::MagicPrompt.form_key(), "magic_prompt");
        assert_eq!(RequestParam::Seed.form_key(), "seed");
        assert_eq!(excluded_params(Some(ModelId::V3)), &[RequestParam::Model]);
    }
}
