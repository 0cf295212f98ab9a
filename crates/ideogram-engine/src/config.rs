use std::env;
use std::fmt;
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "IDEOGRAM_API_KEY";
pub const API_BASE_ENV: &str = "IDEOGRAM_API_BASE";
pub const OUTPUT_DIR_ENV: &str = "IDEOGRAM_OUTPUT_DIR";

pub const DEFAULT_API_BASE: &str = "https://api.ideogram.ai";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

#[derive(Clone)]
pub struct IdeogramConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub output_dir: PathBuf,
}

impl Default for IdeogramConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for IdeogramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdeogramConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl IdeogramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(non_empty_env)
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();
        config.api_key = get(API_KEY_ENV);
        if let Some(api_base) = get(API_BASE_ENV) {
            config = config.with_api_base(api_base);
        }
        if let Some(output_dir) = get(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(output_dir);
        }
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        let normalized = api_base.trim().trim_end_matches('/');
        self.api_base = if normalized.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            normalized.to_string()
        };
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
