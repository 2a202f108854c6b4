use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::capability::Capability;
use crate::errors::RegistryError;
use crate::models::tool::Tool;

/// A catalog of every capability known to the process, indexed by name.
///
/// The registry is a directory, not an authorization boundary: agents are
/// handed the subset they may use at construction. Capabilities are shared,
/// so clearing the registry does not affect agents that already hold them.
#[derive(Default)]
pub struct ToolRegistry {
    capabilities: Vec<Arc<dyn Capability>>,
    metadata: Vec<Tool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability, failing if its name is taken or its declaration is
    /// unusable. A failed registration leaves existing entries untouched.
    pub fn register(&mut self, capability: Arc<dyn Capability>) -> Result<(), RegistryError> {
        let name = capability.name().to_string();

        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if name.is_empty() {
            return Err(RegistryError::InvalidTool {
                name,
                reason: "name must not be empty".to_string(),
            });
        }
        if capability.description().is_empty() {
            return Err(RegistryError::InvalidTool {
                name,
                reason: "description must not be empty".to_string(),
            });
        }
        if let Err(e) = capability.parameters().validate() {
            return Err(RegistryError::InvalidTool {
                name,
                reason: e.to_string(),
            });
        }

        tracing::debug!(tool = %name, "registered tool");
        self.index.insert(name, self.capabilities.len());
        self.metadata.push(capability.metadata());
        self.capabilities.push(capability);
        Ok(())
    }

    /// Register several capabilities in order and hand them back, so the
    /// caller can pass the same list to an agent. Stops at the first failure.
    pub fn register_all<I>(&mut self, capabilities: I) -> Result<Vec<Arc<dyn Capability>>, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Capability>>,
    {
        let mut registered = Vec::new();
        for capability in capabilities {
            self.register(Arc::clone(&capability))?;
            registered.push(capability);
        }
        Ok(registered)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.index
            .get(name)
            .map(|&position| Arc::clone(&self.capabilities[position]))
    }

    pub fn metadata(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&position| &self.metadata[position])
    }

    pub fn list_all(&self) -> Vec<Arc<dyn Capability>> {
        self.capabilities.clone()
    }

    pub fn all_metadata(&self) -> Vec<Tool> {
        self.metadata.clone()
    }

    /// `name -> metadata` as a JSON object, in registration order
    pub fn schema_map(&self) -> Map<String, Value> {
        self.metadata
            .iter()
            .map(|tool| {
                let value = serde_json::to_value(tool).unwrap_or(Value::Null);
                (tool.name.clone(), value)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Forget every entry. Only meant for tests that reuse a registry.
    pub fn clear(&mut self) {
        self.capabilities.clear();
        self.metadata.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolResult;
    use crate::models::schema::{PropertySchema, ToolSchema};
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed {
        name: &'static str,
        description: &'static str,
        parameters: ToolSchema,
        output: Value,
    }

    impl Fixed {
        fn new(name: &'static str, output: Value) -> Self {
            Self {
                name,
                description: "Returns a fixed value",
                parameters: ToolSchema::object(),
                output,
            }
        }
    }

    #[async_trait]
    impl Capability for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        fn parameters(&self) -> &ToolSchema {
            &self.parameters
        }

        async fn call(&self, _arguments: Value) -> ToolResult<Value> {
            Ok(self.output.clone())
        }
    }

    fn names(tools: &[Arc<dyn Capability>]) -> Vec<&str> {
        tools.iter().map(|tool| tool.name()).collect()
    }

    #[test]
    fn test_register_and_lookup() -> anyhow::Result<()> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Fixed::new("alpha", json!(1))))?;
        registry.register(Arc::new(Fixed::new("beta", json!(2))))?;

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.lookup("beta").map(|tool| tool.name().to_string()),
            Some("beta".to_string())
        );
        assert!(registry.lookup("gamma").is_none());
        assert!(registry.lookup("Alpha").is_none());
        assert_eq!(
            registry.metadata("alpha").map(|tool| tool.description.as_str()),
            Some("Returns a fixed value")
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_name_keeps_first() -> anyhow::Result<()> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Fixed::new("alpha", json!("first"))))?;

        let err = registry
            .register(Arc::new(Fixed::new("alpha", json!("second"))))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("alpha".to_string()));

        assert_eq!(registry.len(), 1);
        let kept = registry.lookup("alpha").expect("alpha should stay registered");
        assert_eq!(tokio_test::block_on(kept.call(json!({}))), Ok(json!("first")));
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_declarations() {
        let mut registry = ToolRegistry::new();

        let unnamed = Fixed::new("", json!(null));
        assert!(matches!(
            registry.register(Arc::new(unnamed)),
            Err(RegistryError::InvalidTool { .. })
        ));

        let mut undescribed = Fixed::new("quiet", json!(null));
        undescribed.description = "";
        assert!(matches!(
            registry.register(Arc::new(undescribed)),
            Err(RegistryError::InvalidTool { .. })
        ));

        let mut broken = Fixed::new("broken", json!(null));
        broken.parameters = ToolSchema::object()
            .property("a", PropertySchema::string("a"))
            .required(["b"]);
        assert!(matches!(
            registry.register(Arc::new(broken)),
            Err(RegistryError::InvalidTool { ref name, .. }) if name == "broken"
        ));

        assert!(registry.is_empty());
    }

    #[test]
    fn test_projections_preserve_order_and_are_stable() -> anyhow::Result<()> {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mu"] {
            registry.register(Arc::new(Fixed::new(name, json!(null))))?;
        }

        assert_eq!(names(&registry.list_all()), ["zeta", "alpha", "mu"]);
        let metadata: Vec<_> = registry.all_metadata().into_iter().map(|t| t.name).collect();
        assert_eq!(metadata, ["zeta", "alpha", "mu"]);
        let keys: Vec<_> = registry.schema_map().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha", "mu"]);

        assert_eq!(registry.all_metadata(), registry.all_metadata());
        assert_eq!(registry.schema_map(), registry.schema_map());
        assert_eq!(
            names(&registry.list_all()),
            names(&registry.list_all())
        );
        assert_eq!(registry.schema_map()["mu"]["parameters"]["type"], "object");
        Ok(())
    }

    #[test]
    fn test_register_all_stops_at_first_failure() {
        let mut registry = ToolRegistry::new();
        let result = registry.register_all([
            Arc::new(Fixed::new("one", json!(1))) as Arc<dyn Capability>,
            Arc::new(Fixed::new("one", json!(2))),
            Arc::new(Fixed::new("two", json!(3))),
        ]);
        assert_eq!(result.err(), Some(RegistryError::DuplicateName("one".into())));
        assert_eq!(names(&registry.list_all()), ["one"]);
    }

    #[test]
    fn test_clear_does_not_invalidate_held_capabilities() -> anyhow::Result<()> {
        let mut registry = ToolRegistry::new();
        let held = registry.register_all([Arc::new(Fixed::new("alpha", json!("still here"))) as Arc<dyn Capability>])?;

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.lookup("alpha").is_none());
        assert!(registry.schema_map().is_empty());

        assert_eq!(
            tokio_test::block_on(held[0].call(json!({}))),
            Ok(json!("still here"))
        );

        // the name is free again after a clear
        registry.register(Arc::new(Fixed::new("alpha", json!(0))))?;
        assert_eq!(registry.len(), 1);
        Ok(())
    }
}
