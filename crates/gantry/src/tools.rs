//! Capabilities that ship with gantry
pub mod search;
pub mod weather;

use std::sync::Arc;

use crate::capability::Capability;
use crate::errors::RegistryError;
use crate::registry::ToolRegistry;

pub use search::SearchTool;
pub use weather::WeatherTool;

/// Fresh instances of every built-in capability
pub fn available_tools() -> Vec<Arc<dyn Capability>> {
    vec![
        Arc::new(WeatherTool::new()) as Arc<dyn Capability>,
        Arc::new(SearchTool::new()),
    ]
}

/// A registry holding the built-in capabilities, plus the same list for
/// handing to an agent
pub fn default_registry() -> Result<(ToolRegistry, Vec<Arc<dyn Capability>>), RegistryError> {
    let mut registry = ToolRegistry::new();
    let tools = registry.register_all(available_tools())?;
    Ok((registry, tools))
}
