//! Tool registry for managing and executing tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::context::CallContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Function declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The set of tools available to one call.
///
/// Holds the tools by name and the [`CallContext`] injected into every
/// invocation.
pub struct ToolRegistry {
    /// Registered tools by name.
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Context of the call these tools are bound to.
    context: Arc<CallContext>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            context: Arc::new(CallContext::default()),
        }
    }

    /// Attach the call context.
    pub fn set_context(&mut self, context: CallContext) {
        self.context = Arc::new(context);
    }

    /// The attached call context.
    pub fn context(&self) -> &CallContext {
        &self.context
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared tool.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Registered tool names, sorted.
    pub fn list_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations for every tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Execute a tool by name with the given parameters.
    ///
    /// The attached call context is passed along to the tool.
    pub async fn execute(
        &self,
        name: &str,
        params: HashMap<String, Value>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        info!("Executing tool '{}' with {} params", name, params.len());

        let args = ToolArgs::with_context(params, self.context.clone());
        let result = tool.execute(args).await?;

        debug!(
            "Tool '{}' completed: success={}, content_len={}",
            name,
            result.success,
            result.content.len()
        );

        Ok(result)
    }

    /// Execute a tool with a JSON arguments string.
    ///
    /// An empty string is treated as no arguments.
    pub async fn execute_json(
        &self,
        name: &str,
        args_json: &str,
    ) -> Result<ToolOutput, ToolError> {
        let params: HashMap<String, Value> = if args_json.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(args_json)?
        };
        self.execute(name, params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .field("context", &self.context)
            .finish()
    }
}
