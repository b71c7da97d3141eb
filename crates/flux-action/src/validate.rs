//! Well-formedness checks for actions

use crate::action::{json_kind, Action, ERROR_KEY, META_KEY, PAYLOAD_KEY, TYPE_KEY};
use crate::config::FsaConfig;
use std::collections::BTreeSet;
use thiserror::Error;

/// Reasons an action is not a well-formed message
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Action has no `type` field")]
    MissingType,

    #[error("Action `type` must be a string, got {0}")]
    InvalidType(&'static str),

    #[error("Action has unexpected key `{0}`")]
    UnexpectedKey(String),
}

/// Decides whether an action is a well-formed, dispatchable message
///
/// Implementations must be pure: validating the same action twice yields
/// the same outcome.
pub trait MessageValidator: Send + Sync {
    /// Validate an action, returning the first violation found
    fn validate<P>(&self, action: &Action<P>) -> Result<(), ValidationError>;

    fn is_valid<P>(&self, action: &Action<P>) -> bool {
        self.validate(action).is_ok()
    }

    /// A well-formed action whose `error` field is `true`
    fn is_error<P>(&self, action: &Action<P>) -> bool {
        self.is_valid(action) && action.is_error()
    }
}

/// Flux Standard Action rules
///
/// An action is well-formed when it has a string `type` and carries no keys
/// other than the allowed ones (by default `type`, `payload`, `error` and
/// `meta`).
#[derive(Debug, Clone)]
pub struct FsaValidator {
    allowed_keys: BTreeSet<String>,
}

impl FsaValidator {
    pub fn new() -> Self {
        Self {
            allowed_keys: [TYPE_KEY, PAYLOAD_KEY, ERROR_KEY, META_KEY]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Build a validator from configuration
    ///
    /// `type` is always allowed, whatever the configuration says.
    pub fn from_config(config: &FsaConfig) -> Self {
        let mut allowed_keys: BTreeSet<String> = config.allowed_keys.iter().cloned().collect();
        allowed_keys.insert(TYPE_KEY.to_string());
        Self { allowed_keys }
    }

    pub fn allowed_keys(&self) -> impl Iterator<Item = &str> {
        self.allowed_keys.iter().map(String::as_str)
    }
}

impl Default for FsaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageValidator for FsaValidator {
    fn validate<P>(&self, action: &Action<P>) -> Result<(), ValidationError> {
        match action.field(TYPE_KEY) {
            None => return Err(ValidationError::MissingType),
            Some(value) if !value.is_string() => {
                return Err(ValidationError::InvalidType(json_kind(value)))
            }
            Some(_) => {}
        }

        if let Some(key) = action.keys().find(|key| !self.allowed_keys.contains(*key)) {
            return Err(ValidationError::UnexpectedKey(key.to_string()));
        }

        Ok(())
    }
}

/// Check an action against the default Flux Standard Action rules
pub fn is_fsa<P>(action: &Action<P>) -> bool {
    FsaValidator::new().is_valid(action)
}
