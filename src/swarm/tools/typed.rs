// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write;
use std::marker::PhantomData;

use crate::adk::error::BoxError;
use crate::adk::tool::Tool;

type Handler<A> = Box<dyn Fn(A) -> Result<Value, BoxError> + Send + Sync>;

/// A tool whose arguments deserialize into `A`.
///
/// The JSON schema sent to the model is derived from `A`.
pub struct TypedTool<A> {
    name: String,
    description: String,
    schema: Value,
    handler: Handler<A>,
    _args: PhantomData<fn(A)>,
}

impl<A> TypedTool<A>
where
    A: JsonSchema + DeserializeOwned + Send + 'static,
{
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Fn(A) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let mut schema = serde_json::to_value(schemars::schema_for!(A))
            .unwrap_or_else(|_| json!({ "type": "object" }));
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }

        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Box::new(handler),
            _args: PhantomData,
        }
    }
}

#[async_trait]
impl<A> Tool for TypedTool<A>
where
    A: JsonSchema + DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, args: Value) -> Result<Value, BoxError> {
        let args: A = serde_json::from_value(args)?;
        (self.handler)(args)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CurrentTimeArgs {
    /// strftime-style format; RFC 3339 when omitted
    #[serde(default)]
    pub format: Option<String>,
}

/// Built-in tool reporting the current UTC time
pub fn current_time_tool() -> TypedTool<CurrentTimeArgs> {
    TypedTool::new(
        "current_time",
        "Returns the current UTC date and time",
        |args: CurrentTimeArgs| {
            let now = chrono::Utc::now();
            let formatted = match args.format {
                Some(fmt) => {
                    let mut out = String::new();
                    write!(out, "{}", now.format(&fmt))
                        .map_err(|_| format!("invalid time format: {}", fmt))?;
                    out
                }
                None => now.to_rfc3339(),
            };
            Ok(json!({ "utc": formatted }))
        },
    )
}
