use ideogram_contracts::models::{excluded_params, supports_param, ModelFamily, RequestParam};
use ideogram_contracts::request::GenerationRequest;
use ideogram_contracts::response::RawResult;
use ideogram_contracts::{IdeogramError, Result};
use indexmap::IndexMap;
use reqwest::blocking::multipart::Form as MultipartForm;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};

pub const LEGACY_GENERATE_PATH: &str = "/generate";
pub const V3_GENERATE_PATH: &str = "/v1/ideogram-v3/generate";
pub const API_KEY_HEADER: &str = "Api-Key";
pub const LEGACY_BODY_KEY: &str = "image_request";

const INVALID_RESPONSE: &str = "invalid response structure";

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRequest {
    pub endpoint: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Request {
    pub endpoint: String,
    pub fields: IndexMap<&'static str, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestPlan {
    Legacy(LegacyRequest),
    V3(V3Request),
}

impl RequestPlan {
    pub fn endpoint(&self) -> &str {
        match self {
            RequestPlan::Legacy(request) => &request.endpoint,
            RequestPlan::V3(request) => &request.endpoint,
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            RequestPlan::Legacy(_) => ModelFamily::Legacy,
            RequestPlan::V3(_) => ModelFamily::V3,
        }
    }
}

pub fn plan_request(api_base: &str, request: &GenerationRequest) -> Result<RequestPlan> {
    match ModelFamily::of(request.model) {
        ModelFamily::V3 => Ok(RequestPlan::V3(V3Request {
            endpoint: format!("{api_base}{V3_GENERATE_PATH}"),
            fields: v3_form_fields(request)?,
        })),
        ModelFamily::Legacy => Ok(RequestPlan::Legacy(LegacyRequest {
            endpoint: format!("{api_base}{LEGACY_GENERATE_PATH}"),
            body: legacy_body(request)?,
        })),
    }
}

fn legacy_body(request: &GenerationRequest) -> Result<Value> {
    let encoded = serde_json::to_value(request)
        .map_err(|err| IdeogramError::input(format!("failed to encode request: {err}")))?;
    let mut params: Map<String, Value> = match encoded {
        Value::Object(map) => map,
        _ => return Err(IdeogramError::input("request did not encode to an object")),
    };
    for param in excluded_params(request.model) {
        params.remove(param.json_key());
    }
    let mut body = Map::new();
    body.insert(LEGACY_BODY_KEY.to_string(), Value::Object(params));
    Ok(Value::Object(body))
}

fn v3_form_fields(request: &GenerationRequest) -> Result<IndexMap<&'static str, String>> {
    let palette = request
        .color_palette
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|err| IdeogramError::input(format!("failed to encode color_palette: {err}")))?;

    let model = request.model;
    let mut fields = IndexMap::new();
    let mut put = |param: RequestParam, value: Option<String>| {
        if let Some(value) = value {
            if supports_param(model, param) {
                fields.insert(param.form_key(), value);
            }
        }
    };
    put(RequestParam::Prompt, Some(request.prompt.clone()));
    put(
        RequestParam::AspectRatio,
        request.aspect_ratio.map(|ratio| ratio.v3_token()),
    );
    put(
        RequestParam::Model,
        request.model.map(|model| model.as_str().to_string()),
    );
    put(
        RequestParam::RenderingSpeed,
        request.rendering_speed.map(|speed| speed.as_str().to_string()),
    );
    put(
        RequestParam::MagicPrompt,
        request
            .magic_prompt_option
            .map(|option| option.as_str().to_string()),
    );
    put(RequestParam::Seed, request.seed.map(|seed| seed.to_string()));
    put(RequestParam::StyleType, request.style_type.clone());
    put(RequestParam::NegativePrompt, request.negative_prompt.clone());
    put(
        RequestParam::NumImages,
        request.num_images.map(|count| count.to_string()),
    );
    put(RequestParam::Resolution, request.resolution.clone());
    put(RequestParam::ColorPalette, palette);
    Ok(fields)
}

pub fn execute_plan(http: &HttpClient, api_key: &str, plan: RequestPlan) -> Result<Value> {
    let builder = match plan {
        RequestPlan::Legacy(request) => http
            .post(&request.endpoint)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&request.body),
        RequestPlan::V3(request) => {
            let form = request
                .fields
                .into_iter()
                .fold(MultipartForm::new(), |form, (name, value)| {
                    form.text(name, value)
                });
            http.post(&request.endpoint)
                .header(API_KEY_HEADER, api_key)
                .multipart(form)
        }
    };
    let response = builder
        .send()
        .map_err(|err| IdeogramError::upstream(err.to_string()))?;
    response_json_or_error(response)
}

fn response_json_or_error(response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| IdeogramError::upstream(err.to_string()))?;
    if !status.is_success() {
        let message = error_message_from_body(&body)
            .unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));
        return Err(IdeogramError::upstream(message));
    }
    serde_json::from_str(&body).map_err(|_| IdeogramError::upstream(INVALID_RESPONSE))
}

/// Most specific error text in an upstream body: `message`, then `description`.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    ["message", "description"].into_iter().find_map(|key| {
        parsed
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

pub fn parse_generation_body(payload: &Value) -> Result<(String, Vec<RawResult>)> {
    let rows = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| IdeogramError::upstream(INVALID_RESPONSE))?;
    let items = rows
        .iter()
        .map(|row| {
            serde_json::from_value::<RawResult>(row.clone())
                .map_err(|_| IdeogramError::upstream(INVALID_RESPONSE))
        })
        .collect::<Result<Vec<RawResult>>>()?;
    let created = match payload.get("created") {
        Some(Value::String(created)) => created.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Ok((created, items))
}
