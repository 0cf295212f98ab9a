use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_image_safe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_type: Option<String>,
}

impl RawResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: None,
            prompt: None,
            resolution: None,
            is_image_safe: None,
            seed: None,
            style_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub id: String,
    pub url: String,
    pub local_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_image_safe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_type: Option<String>,
}

impl GenerationResult {
    pub fn from_raw(raw: RawResult, id: String, local_path: PathBuf) -> Self {
        Self {
            id,
            url: raw.url,
            local_path,
            prompt: raw.prompt,
            resolution: raw.resolution,
            is_image_safe: raw.is_image_safe,
            seed: raw.seed,
            style_type: raw.style_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResponse {
    pub created: String,
    pub data: Vec<GenerationResult>,
}

impl GenerationResponse {
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Generated {} image(s):", self.data.len())];
        lines.extend(self.data.iter().map(|item| item.url.clone()));
        if !self.data.is_empty() {
            lines.push("Saved to:".to_string());
            lines.extend(
                self.data
                    .iter()
                    .map(|item| item.local_path.display().to_string()),
            );
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{GenerationResponse, GenerationResult, RawResult};

    #[test]
    fn raw_result_tolerates_missing_metadata() -> anyhow::Result<()> {
        let raw: RawResult = serde_json::from_str(r#"{"url":"https://x/a.png"}"#)?;
        assert_eq!(raw, RawResult::new("https://x/a.png"));
        Ok(())
    }

    #[test]
    fn summary_lists_urls_then_paths_in_order() {
        let response = GenerationResponse {
            created: "2024-01-01T00:00:00Z".to_string(),
            data: vec![
                GenerationResult::from_raw(
                    RawResult::new("https://x/one.png"),
                    "one".to_string(),
                    PathBuf::from("out/one.png"),
                ),
                GenerationResult::from_raw(
                    RawResult::new("https://x/two.png"),
                    "two".to_string(),
                    PathBuf::from("out/two.png"),
                ),
            ],
        };
        assert_eq!(
            response.summary(),
            "Generated 2 image(s):\nhttps://x/one.png\nhttps://x/two.png\nSaved to:\nout/one.png\nout/two.png"
        );
    }

    #[test]
    fn summary_for_empty_response_has_no_saved_block() {
        let response = GenerationResponse {
            created: String::new(),
            data: Vec::new(),
        };
        assert_eq!(response.summary(), "Generated 0 image(s):");
    }
}
