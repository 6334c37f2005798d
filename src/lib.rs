//! ollamaprime - Ollama startup bootstrapper
//!
//! Waits for a local Ollama daemon to become reachable, pulls the LLM and
//! embedding models the caller depends on, and lists installed models for
//! confirmation. Intended for container startup ordering, where the daemon
//! and its dependents launch together.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;

// Re-export commonly used types
pub use bootstrap::{BootstrapConfig, BootstrapReport, Bootstrapper};
pub use errors::{PrimerError, Result};
