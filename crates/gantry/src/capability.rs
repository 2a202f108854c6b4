use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ToolResult;
use crate::models::schema::ToolSchema;
use crate::models::tool::Tool;

/// Core trait for something the model can invoke by name.
///
/// Implementations may assume nothing about `arguments` beyond what their
/// schema promises the model, so they validate whatever fields they read.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique name, used by the model to request this capability
    fn name(&self) -> &str;

    /// What the capability does, written for the model
    fn description(&self) -> &str;

    /// Declared argument shape
    fn parameters(&self) -> &ToolSchema;

    /// Run the capability. Success must be JSON serialisable.
    async fn call(&self, arguments: Value) -> ToolResult<Value>;

    /// The declarative view of this capability
    fn metadata(&self) -> Tool {
        Tool::new(self.name(), self.description(), self.parameters().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolError;
    use crate::models::schema::PropertySchema;
    use serde_json::json;

    struct Echo {
        parameters: ToolSchema,
    }

    #[async_trait]
    impl Capability for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the input"
        }

        fn parameters(&self) -> &ToolSchema {
            &self.parameters
        }

        async fn call(&self, arguments: Value) -> ToolResult<Value> {
            self.parameters.validate_arguments(&arguments)?;
            Ok(arguments["message"].clone())
        }
    }

    fn echo() -> Echo {
        Echo {
            parameters: ToolSchema::object()
                .property("message", PropertySchema::string("What to echo"))
                .required(["message"]),
        }
    }

    #[test]
    fn test_metadata_mirrors_capability() {
        let metadata = echo().metadata();
        assert_eq!(metadata.name, "echo");
        assert_eq!(metadata.description, "Echoes back the input");
        assert_eq!(metadata.parameters.required, vec!["message".to_string()]);
    }

    #[test]
    fn test_call_through_trait_object() {
        let capability: Box<dyn Capability> = Box::new(echo());
        let output = tokio_test::block_on(capability.call(json!({"message": "hi"})));
        assert_eq!(output, Ok(json!("hi")));

        let err = tokio_test::block_on(capability.call(json!({})));
        assert!(matches!(err, Err(ToolError::InvalidParameters(_))));
    }
}
