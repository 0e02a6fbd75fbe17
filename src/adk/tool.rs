// SPDX-License-Identifier: MIT

use crate::adk::error::BoxError;
use async_trait::async_trait;
use serde_json::Value;

/// A named handler an LLM-backed step may invoke.
///
/// `name()` must be unique within a registry. `schema()` describes the JSON
/// arguments `execute` accepts and is sent to the model verbatim.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn schema(&self) -> &Value;

    async fn execute(&self, args: Value) -> Result<Value, BoxError>;
}
