// SPDX-License-Identifier: MIT

//! swarm-graph executes declarative agent workflows: a graph of nodes and
//! edges walked from an entry node to an exit node, one step at a time.
//!
//! - [`adk`] holds the agent primitives (errors, models, tools)
//! - [`swarm`] holds the workflow engine and its transports

pub mod adk;
pub mod swarm;
