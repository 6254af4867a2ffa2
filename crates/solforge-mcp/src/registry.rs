// crates/solforge-mcp/src/registry.rs
// ============================================================================
// Module: Tool Registry
// Description: Tool handler trait, descriptors, and validated dispatch.
// Purpose: Hold the immutable tool set and validate inputs before calls.
// Dependencies: jsonschema, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The registry is populated once at startup and never mutated after.
//! Each tool registers a name, description, and JSON Schema; the schema
//! is compiled at registration so malformed schemas fail server startup
//! instead of the first call. Dispatch validates arguments against the
//! compiled schema and only then invokes the handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use jsonschema::Draft;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two tools registered under the same name.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
    /// A tool declared a schema that does not compile.
    #[error("invalid input schema for tool {tool}: {message}")]
    InvalidSchema {
        /// Name of the offending tool.
        tool: String,
        /// Compiler message.
        message: String,
    },
}

/// Errors raised by tool dispatch and tool handlers.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// The arguments failed schema validation or were structurally wrong.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// The arguments were well-formed but semantically rejected.
    #[error("{0}")]
    Invalid(String),
    /// An upstream RPC node failed or misbehaved.
    #[error("upstream failure: {message}")]
    Upstream {
        /// Failure summary.
        message: String,
        /// Raw detail from the upstream node, when available.
        details: Option<String>,
    },
    /// A bounded search exhausted its space.
    #[error("{0}")]
    Exhausted(String),
    /// A local filesystem operation failed.
    #[error("{0}")]
    Io(String),
    /// An internal invariant failed.
    #[error("internal error: {0}")]
    Internal(String),
    /// A result value could not be serialized.
    #[error("result serialization failed")]
    Serialization,
}

// ============================================================================
// SECTION: Handler Trait
// ============================================================================

/// One callable tool.
pub trait ToolHandler: Send + Sync {
    /// Stable tool name used for routing.
    fn name(&self) -> &'static str;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's arguments object.
    fn input_schema(&self) -> Value;

    /// Executes the tool with schema-validated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the arguments are semantically invalid
    /// or the tool's work fails.
    fn handle(&self, arguments: Value) -> Result<Value, ToolError>;
}

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Tool metadata surfaced by `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Stable tool name.
    pub name: String,
    /// One-line human description.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub input_schema: Value,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// One registered tool with its compiled schema.
struct RegisteredTool {
    /// Handler implementation.
    handler: Box<dyn ToolHandler>,
    /// Schema compiled at registration.
    validator: Validator,
}

/// Immutable tool set keyed by name.
pub struct ToolRegistry {
    /// Registered tools in registration order.
    tools: Vec<RegisteredTool>,
    /// Name to slot index.
    index: BTreeMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Registers a tool, compiling its schema.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] for a repeated name and
    /// [`RegistryError::InvalidSchema`] when the schema does not compile.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = handler.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        let schema = handler.input_schema();
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| RegistryError::InvalidSchema {
                tool: name.clone(),
                message: err.to_string(),
            })?;
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool { handler, validator });
        Ok(())
    }

    /// Returns descriptors for every registered tool, in registration
    /// order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.handler.name().to_string(),
                description: tool.handler.description().to_string(),
                input_schema: tool.handler.input_schema(),
            })
            .collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validates arguments against the tool's schema and invokes it.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for unregistered names,
    /// [`ToolError::InvalidParams`] for schema violations, and whatever
    /// the handler itself raises.
    pub fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let slot = self
            .index
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let tool = self
            .tools
            .get(*slot)
            .ok_or_else(|| ToolError::Internal("registry index out of sync".to_string()))?;
        let violations: Vec<String> =
            tool.validator.iter_errors(&arguments).map(|err| err.to_string()).collect();
        if !violations.is_empty() {
            return Err(ToolError::InvalidParams(violations.join("; ")));
        }
        tool.handler.handle(arguments)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::Value;
    use serde_json::json;

    use super::RegistryError;
    use super::ToolError;
    use super::ToolHandler;
    use super::ToolRegistry;

    /// Handler echoing its validated arguments.
    struct EchoTool;

    impl ToolHandler for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes its arguments."
        }

        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                },
                "required": ["message"],
                "additionalProperties": false
            })
        }

        fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
            Ok(arguments)
        }
    }

    /// Builds a registry holding the echo tool.
    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).expect("echo registers");
        registry
    }

    #[test]
    fn valid_arguments_reach_the_handler() {
        let registry = echo_registry();
        let result = registry.call("echo", json!({ "message": "hi" })).expect("call succeeds");
        assert_eq!(result["message"], "hi");
    }

    #[test]
    fn schema_violations_become_invalid_params() {
        let registry = echo_registry();
        let err = registry.call("echo", json!({ "message": 7 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn extra_properties_are_rejected() {
        let registry = echo_registry();
        let err = registry.call("echo", json!({ "message": "hi", "extra": 1 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn unknown_tool_names_the_tool() {
        let registry = echo_registry();
        let err = registry.call("missing", json!({})).unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = echo_registry();
        let err = registry.register(Box::new(EchoTool)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(_)));
    }

    #[test]
    fn descriptors_expose_camel_case_schema_key() {
        let registry = echo_registry();
        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 1);
        let json = serde_json::to_value(&descriptors[0]).expect("descriptor serializes");
        assert!(json.get("inputSchema").is_some());
    }
}
