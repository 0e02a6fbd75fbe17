// SPDX-License-Identifier: MIT

use crate::adk::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name → handler table shared by every step executor.
///
/// Clones share the same table.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tool, replacing any tool of the same name
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        if tools.insert(tool.name().to_string(), tool).is_some() {
            log::debug!("Replaced an existing tool registration");
        }
    }

    /// Register a tool only if its name is free. Returns whether it was added.
    pub async fn register_if_absent(&self, tool: Arc<dyn Tool>) -> bool {
        let mut tools = self.tools.write().await;
        if tools.contains_key(tool.name()) {
            return false;
        }
        tools.insert(tool.name().to_string(), tool);
        true
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Look up several tools at once, skipping (and logging) unknown names
    pub async fn resolve(&self, names: &[&str]) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        names
            .iter()
            .filter_map(|name| {
                let tool = tools.get(*name).cloned();
                if tool.is_none() {
                    log::warn!("Tool not found: {}", name);
                }
                tool
            })
            .collect()
    }

    /// Registered names, sorted
    pub async fn names(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
