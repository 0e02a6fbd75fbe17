// SPDX-License-Identifier: MIT

//! Runtime configuration read from the environment
//!
//! `.env` is loaded by the binary before [`SwarmConfig::from_env`] runs;
//! command-line flags are applied on top afterwards.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use crate::adk::error::SwarmError;
use crate::adk::model::GenerationConfig;
use crate::swarm::workflow::graph::HistoryMode;

pub const DEFAULT_MODEL_NAME: &str = "llama3-70b-8192";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MAX_TURNS: u32 = 10;
pub const DEFAULT_PORT: u16 = 3000;

/// Which step executor drives the nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutorKind {
    /// Language model behind an OpenAI-compatible endpoint
    #[default]
    Llm,
    /// Deterministic `"<id>:<input>"` output
    Echo,
}

impl FromStr for ExecutorKind {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "echo" => Ok(Self::Echo),
            other => Err(SwarmError::config(format!("unknown executor: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwarmConfig {
    pub executor: ExecutorKind,
    pub model_name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub history: HistoryMode,
    pub max_turns: u32,
    pub port: u16,
    /// Sampling settings sent with every model call; unset means provider default
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorKind::default(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            history: HistoryMode::default(),
            max_turns: DEFAULT_MAX_TURNS,
            port: DEFAULT_PORT,
            temperature: None,
            max_tokens: None,
            top_p: None,
        }
    }
}

impl SwarmConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self, SwarmError> {
        Self::from_vars(env::vars().collect())
    }

    /// Build a config from an explicit variable table.
    ///
    /// Unset or blank variables keep their defaults; malformed values fail.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SwarmError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(executor) = get("SWARM_EXECUTOR") {
            config.executor = executor.parse()?;
        }
        if let Some(model_name) = get("MODEL_NAME") {
            config.model_name = model_name;
        }
        if let Some(base_url) = get("MODEL_BASE_URL") {
            config.base_url = base_url;
        }
        config.api_key = get("GROQ_API_KEY").or_else(|| get("OPENAI_API_KEY"));
        if let Some(history) = get("SWARM_HISTORY") {
            config.history = history.parse()?;
        }
        if let Some(max_turns) = get("SWARM_MAX_TURNS") {
            config.max_turns = max_turns.parse().map_err(|_| {
                SwarmError::config(format!("SWARM_MAX_TURNS must be a number, got {}", max_turns))
            })?;
        }
        if let Some(port) = get("SWARM_PORT") {
            config.port = port.parse().map_err(|_| {
                SwarmError::config(format!("SWARM_PORT must be a port number, got {}", port))
            })?;
        }

        config.temperature = parse_optional(get("SWARM_TEMPERATURE"), "SWARM_TEMPERATURE")?;
        config.max_tokens = parse_optional(get("SWARM_MAX_TOKENS"), "SWARM_MAX_TOKENS")?;
        config.top_p = parse_optional(get("SWARM_TOP_P"), "SWARM_TOP_P")?;

        log::debug!(
            "Config: executor={:?} model={} base_url={} history={:?} max_turns={}",
            config.executor,
            config.model_name,
            config.base_url,
            config.history,
            config.max_turns
        );
        Ok(config)
    }

    /// Per-call sampling settings for the LLM executor
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: None,
            temperature: self.temperature,
            max_output_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }
}

fn parse_optional<T: FromStr>(value: Option<String>, key: &str) -> Result<Option<T>, SwarmError> {
    value
        .map(|v| {
            v.parse()
                .map_err(|_| SwarmError::config(format!("{} must be a number, got {}", key, v)))
        })
        .transpose()
}
