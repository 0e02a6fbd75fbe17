// SPDX-License-Identifier: MIT

//! Workflow loader - reads request envelopes from files and strings
//!
//! JSON is the wire format; YAML is accepted for hand-written workflow files.

use super::types::WorkflowRequest;
use crate::adk::error::SwarmError;
use std::fs;
use std::path::Path;

/// Loads workflow request envelopes
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a request from a file, choosing the parser by extension.
    ///
    /// `.yaml` and `.yml` go through the YAML parser, anything else is JSON.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowRequest, SwarmError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::debug!("Loaded workflow file {:?} ({} bytes)", path, content.len());

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            _ => Self::parse_json(&content),
        }
    }

    pub fn parse_json(content: &str) -> Result<WorkflowRequest, SwarmError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn parse_yaml(content: &str) -> Result<WorkflowRequest, SwarmError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new()
    }
}
