// SPDX-License-Identifier: MIT

//! Graph model and traversal
//!
//! `types` holds the immutable graph and its validation; `executor` walks it.

pub mod executor;
pub mod types;

pub use executor::{HistoryMode, TraversalEngine, TraversalResult, NO_OUTPUT};
pub use types::{validate, Edge, Graph, GraphDefinition, Node};
