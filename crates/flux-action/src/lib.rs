//! Flux Standard Actions
//!
//! This crate provides:
//! - The [`Action`] record dispatched through a store
//! - Well-formedness checks ([`MessageValidator`], [`FsaValidator`])
//! - Validator configuration loaded from TOML ([`FsaConfig`])
//!
//! # Example
//!
//! ```
//! use flux_action::{is_fsa, Action};
//! use serde_json::json;
//!
//! let action = Action::new("ADD_TODO").with_payload(json!({"text": "write docs"}));
//! assert!(is_fsa(&action));
//!
//! let random = Action::<serde_json::Value>::try_from(json!({"random": "stuff"}))?;
//! assert!(!is_fsa(&random));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod action;
pub mod config;
pub mod validate;

pub use action::{Action, ActionError};
pub use config::{ConfigError, FsaConfig};
pub use validate::{is_fsa, FsaValidator, MessageValidator, ValidationError};
