// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::adk::error::BoxError;
use crate::adk::tool::Tool;
use crate::swarm::workflow::types::FunctionDefinition;

/// Handler for a function an agent declares without an implementation.
///
/// Echoes its call back as `{"function", "args", "result"}` so the model can
/// carry on.
pub struct FunctionTool {
    definition: FunctionDefinition,
}

impl FunctionTool {
    pub fn new(definition: FunctionDefinition) -> Self {
        Self { definition }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    fn schema(&self) -> &Value {
        &self.definition.parameters
    }

    async fn execute(&self, args: Value) -> Result<Value, BoxError> {
        Ok(json!({
            "function": self.definition.name,
            "args": args,
            "result": format!("Mock response from {}", self.definition.name)
        }))
    }
}
