use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "V_1")]
    V1,
    #[serde(rename = "V_1_TURBO")]
    V1Turbo,
    #[serde(rename = "V_2")]
    V2,
    #[serde(rename = "V_2_TURBO")]
    V2Turbo,
    #[serde(rename = "V_2A")]
    V2a,
    #[serde(rename = "V_2A_TURBO")]
    V2aTurbo,
    #[serde(rename = "V_3")]
    V3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// `/generate`, JSON body wrapped in `image_request`, bearer credential.
    Legacy,
    /// `/v1/ideogram-v3/generate`, multipart form, `Api-Key` credential.
    V3,
}

impl ModelId {
    pub const ALL: [ModelId; 7] = [
        ModelId::V1,
        ModelId::V1Turbo,
        ModelId::V2,
        ModelId::V2Turbo,
        ModelId::V2a,
        ModelId::V2aTurbo,
        ModelId::V3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::V1 => "V_1",
            ModelId::V1Turbo => "V_1_TURBO",
            ModelId::V2 => "V_2",
            ModelId::V2Turbo => "V_2_TURBO",
            ModelId::V2a => "V_2A",
            ModelId::V2aTurbo => "V_2A_TURBO",
            ModelId::V3 => "V_3",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == normalized)
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            ModelId::V3 => ModelFamily::V3,
            _ => ModelFamily::Legacy,
        }
    }
}

impl ModelFamily {
    /// Requests without a model go to the legacy endpoint, which picks its own default.
    pub fn of(model: Option<ModelId>) -> Self {
        model.map(|model| model.family()).unwrap_or(ModelFamily::Legacy)
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelFamily, ModelId};

    #[test]
    fn parse_accepts_wire_names_case_insensitively() {
        assert_eq!(ModelId::parse("V_2A_TURBO"), Some(ModelId::V2aTurbo));
        assert_eq!(ModelId::parse(" v_3 "), Some(ModelId::V3));
        assert_eq!(ModelId::parse("V_4"), None);
        assert_eq!(ModelId::parse(""), None);
    }

    #[test]
    fn only_v3_belongs_to_the_newest_family() {
        for model in ModelId::ALL {
            let expected = if model == ModelId::V3 {
                ModelFamily::V3
            } else {
                ModelFamily::Legacy
            };
            assert_eq!(model.family(), expected, "{}", model.as_str());
        }
        assert_eq!(ModelFamily::of(None), ModelFamily::Legacy);
    }

    #[test]
    fn serde_names_match_as_str() -> anyhow::Result<()> {
        for model in ModelId::ALL {
            let encoded = serde_json::to_value(model)?;
            assert_eq!(encoded, serde_json::json!(model.as_str()));
        }
        Ok(())
    }
}
