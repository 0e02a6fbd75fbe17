// SPDX-License-Identifier: MIT

pub mod agent_factory;
pub mod conversation;
pub mod graph;
pub mod loader;
pub mod registry;
pub mod step;
pub mod stream;
pub mod types;
