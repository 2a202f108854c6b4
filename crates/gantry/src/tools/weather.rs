use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::capability::Capability;
use crate::errors::{ToolError, ToolResult};
use crate::models::schema::{PropertySchema, ToolSchema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
    #[serde(default)]
    unit: Option<TemperatureUnit>,
}

/// Simulated current weather lookup
pub struct WeatherTool {
    parameters: ToolSchema,
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            parameters: ToolSchema::object()
                .property(
                    "location",
                    PropertySchema::string("The city and state, e.g., San Francisco, CA"),
                )
                .property(
                    "unit",
                    PropertySchema::string("The unit of temperature to return")
                        .with_tags(["celsius", "fahrenheit"]),
                )
                .required(["location"])
                .additional_properties(false),
        }
    }

    pub fn report(location: &str, unit: TemperatureUnit) -> String {
        let temp = match unit {
            TemperatureUnit::Celsius => "24°C",
            TemperatureUnit::Fahrenheit => "75°F",
        };
        format!("The weather in {} is {} and sunny (simulated).", location, temp)
    }
}

#[async_trait]
impl Capability for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a location"
    }

    fn parameters(&self) -> &ToolSchema {
        &self.parameters
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        self.parameters.validate_arguments(&arguments)?;
        let args: WeatherArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        Ok(Value::String(Self::report(
            &args.location,
            args.unit.unwrap_or_default(),
        )))
    }
}
