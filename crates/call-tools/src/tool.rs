//! Tool trait definition and types.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::CallContext;
use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone)]
pub struct ToolArgs {
    /// Parameters as key-value pairs, as produced by the LLM.
    pub params: HashMap<String, Value>,
    /// The call this invocation belongs to.
    pub context: Arc<CallContext>,
}

impl ToolArgs {
    /// Create tool arguments with an empty call context.
    pub fn new(params: HashMap<String, Value>) -> Self {
        Self {
            params,
            context: Arc::new(CallContext::default()),
        }
    }

    /// Create tool arguments for a specific call.
    pub fn with_context(params: HashMap<String, Value>, context: Arc<CallContext>) -> Self {
        Self { params, context }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional string parameter. Blank strings count as absent.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params
            .get(key)?
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text the model reads back to the caller (plain or JSON).
    pub content: String,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed output.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: false,
        }
    }
}

/// A function the voice model can call during a conversation.
///
/// Provider failures are turned into a user-facing [`ToolOutput::failure`]
/// by the tool itself; `Err` is reserved for bad arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the accepted parameters.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}
