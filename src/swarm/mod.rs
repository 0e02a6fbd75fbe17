// SPDX-License-Identifier: MIT

pub mod bridge;
pub mod config;
pub mod server;
pub mod tools;
pub mod workflow;
