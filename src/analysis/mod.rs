//! Analysis modules.
//!
//! This module contains the request pipeline and the join-all-settled
//! helpers it is built on.

pub mod orchestrator;
pub mod settle;

pub use orchestrator::Orchestrator;
