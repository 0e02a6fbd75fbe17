// SPDX-License-Identifier: MIT

//! OpenAI-compatible chat completions backend
//!
//! Works against any endpoint that implements `/chat/completions`, such as
//! Groq (the default base URL) or OpenAI itself.

use super::{Content, GenerationConfig, Model, ModelRole, Part};
use crate::adk::error::{BoxError, ModelError, SwarmError};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

/// Chat-completions model over HTTP
pub struct ChatCompletionsModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl ChatCompletionsModel {
    pub fn new(
        model_name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ModelError> {
        let base_url = base_url.into();
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ModelError::ApiKeyMissing(base_url.clone()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name: model_name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Convert internal Content to chat-completions message format
    fn to_wire_message(content: &Content) -> Value {
        if let Some(Part::FunctionResponse { id, response, .. }) = content
            .parts
            .iter()
            .find(|p| matches!(p, Part::FunctionResponse { .. }))
        {
            return json!({
                "role": "tool",
                "tool_call_id": id,
                "content": serde_json::to_string(response).unwrap_or_default()
            });
        }

        let mut tool_calls = Vec::new();
        let mut text = String::new();
        for part in &content.parts {
            match part {
                Part::Text(t) => text.push_str(t),
                Part::FunctionCall { id, name, args } => tool_calls.push(json!({
                    "id": id,
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": serde_json::to_string(args).unwrap_or_default()
                    }
                })),
                Part::FunctionResponse { .. } => {}
            }
        }

        let role = match content.role {
            ModelRole::System => "system",
            ModelRole::User => "user",
            ModelRole::Assistant => "assistant",
            ModelRole::Tool => "tool",
        };

        if tool_calls.is_empty() {
            json!({ "role": role, "content": text })
        } else {
            json!({
                "role": role,
                "content": if text.is_empty() { Value::Null } else { json!(text) },
                "tool_calls": tool_calls
            })
        }
    }

    fn tools_to_wire(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    }
                })
            })
            .collect()
    }

    /// Split a multi-part tool response into one wire message per call
    fn expand_history(history: &[Content]) -> Vec<Value> {
        let mut messages = Vec::with_capacity(history.len());
        for content in history {
            let responses: Vec<&Part> = content
                .parts
                .iter()
                .filter(|p| matches!(p, Part::FunctionResponse { .. }))
                .collect();
            if responses.len() > 1 {
                for part in responses {
                    messages.push(Self::to_wire_message(&Content {
                        role: ModelRole::Tool,
                        parts: vec![part.clone()],
                    }));
                }
            } else {
                messages.push(Self::to_wire_message(content));
            }
        }
        messages
    }

    /// Assemble the `/chat/completions` payload
    fn request_body(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Value {
        let model = config
            .and_then(|c| c.model.as_deref())
            .unwrap_or(self.model_name.as_str());

        let mut body = json!({
            "model": model,
            "messages": Self::expand_history(history)
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            body["tools"] = json!(Self::tools_to_wire(tools));
            body["tool_choice"] = json!("auto");
        }
        body
    }

    /// Non-success response, keyed by the provider host
    fn api_error(&self, status: StatusCode, body: &str) -> SwarmError {
        let provider = self
            .base_url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or(self.base_url.as_str());
        SwarmError::api(provider, format!("{}: {}", status, body.trim()))
    }

    fn parse_response(response: &Value) -> Result<Content, ModelError> {
        let message = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".to_string()))?;

        let mut parts = Vec::new();
        if let Some(text) = message["content"].as_str() {
            if !text.is_empty() {
                parts.push(Part::Text(text.to_string()));
            }
        }

        if let Some(tool_calls) = message["tool_calls"].as_array() {
            for (i, tc) in tool_calls.iter().enumerate() {
                let name = tc["function"]["name"]
                    .as_str()
                    .ok_or_else(|| {
                        ModelError::InvalidResponse("tool call without a name".to_string())
                    })?
                    .to_string();
                let id = tc["id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("call_{}", i));
                let raw_args = tc["function"]["arguments"].as_str().unwrap_or("{}");
                let args = serde_json::from_str(raw_args).unwrap_or_else(|_| json!({}));
                parts.push(Part::FunctionCall { id, name, args });
            }
        }

        Ok(Content {
            role: ModelRole::Assistant,
            parts,
        })
    }
}

#[async_trait]
impl Model for ChatCompletionsModel {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, BoxError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = self.request_body(history, config, tools);

        log::debug!(
            "Chat completions request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ModelError::RateLimited { retry_after_secs }.into());
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(self.api_error(status, &text).into());
        }

        let resp_json: Value = resp.json().await?;
        Ok(Self::parse_response(&resp_json)?)
    }
}
