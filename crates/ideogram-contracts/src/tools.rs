use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::IdeogramError;
use crate::rpc::codes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn code(&self) -> i64 {
        match self {
            ToolError::InvalidParams(_) => codes::INVALID_PARAMS,
            ToolError::NotFound(_) => codes::METHOD_NOT_FOUND,
            ToolError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<IdeogramError> for ToolError {
    fn from(err: IdeogramError) -> Self {
        match err {
            IdeogramError::InputValidation(message) => ToolError::InvalidParams(message),
            other => ToolError::Internal(other.to_string()),
        }
    }
}

pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    /// Runs the tool and returns the text shown to the caller.
    fn call(&self, arguments: Option<&Value>) -> Result<String, ToolError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut descriptors = self
            .tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect::<Vec<ToolDescriptor>>();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub fn call(&self, name: &str, arguments: Option<&Value>) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(format!("Unknown tool: {name}")))?;
        tool.call(arguments)
    }
}
