//! Repository reference handling.
//!
//! This module parses and validates the repository references users submit.

pub mod identifier;

pub use identifier::RepositoryIdentifier;
