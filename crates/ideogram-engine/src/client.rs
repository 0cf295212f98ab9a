use std::path::Path;

use ideogram_contracts::request::GenerationRequest;
use ideogram_contracts::response::GenerationResponse;
use ideogram_contracts::{IdeogramError, Result};
use reqwest::blocking::Client as HttpClient;
use tracing::{debug, info, instrument};

use crate::adapter::{execute_plan, parse_generation_body, plan_request};
use crate::config::{IdeogramConfig, API_KEY_ENV};
use crate::materializer::ImageMaterializer;

const USER_AGENT: &str = concat!("ideogram-mcp/", env!("CARGO_PKG_VERSION"));

pub struct IdeogramClient {
    http: HttpClient,
    api_key: String,
    api_base: String,
    materializer: ImageMaterializer,
}

impl IdeogramClient {
    pub fn new(config: IdeogramConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IdeogramError::configuration(format!("{API_KEY_ENV} is required")))?;
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| {
                IdeogramError::configuration(format!("failed to build HTTP client: {err}"))
            })?;
        let materializer = ImageMaterializer::new(http.clone(), config.output_dir.clone());
        Ok(Self {
            http,
            api_key,
            api_base: config.api_base,
            materializer,
        })
    }

    pub fn output_dir(&self) -> &Path {
        self.materializer.output_dir()
    }

    #[instrument(skip_all, fields(model = ?request.model, num_images = ?request.num_images))]
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        request.validate()?;
        let plan = plan_request(&self.api_base, request)?;
        info!(endpoint = plan.endpoint(), family = ?plan.family(), "submitting generation request");

        let payload = execute_plan(&self.http, &self.api_key, plan)?;
        let (created, items) = parse_generation_body(&payload)?;
        debug!(count = items.len(), "upstream returned images");

        let data = self.materializer.materialize(items, &request.prompt)?;
        info!(count = data.len(), output_dir = %self.output_dir().display(), "images materialized");
        Ok(GenerationResponse { created, data })
    }
}
