//! Structured action record
//!
//! An [`Action`] is a set of named fields. The `payload` field is kept apart
//! from the rest so it can carry a richer type than JSON (e.g. a callable),
//! every other field is a plain [`serde_json::Value`].

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub const TYPE_KEY: &str = "type";
pub const PAYLOAD_KEY: &str = "payload";
pub const ERROR_KEY: &str = "error";
pub const META_KEY: &str = "meta";

/// Errors that can occur when building an action from raw JSON
#[derive(Error, Debug, PartialEq)]
pub enum ActionError {
    #[error("Action must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A dispatched message
///
/// `type` is stored like any other field, so records that are not
/// well-formed (no `type`, extra keys) are representable too. Whether an
/// action is well-formed is decided by a [`crate::MessageValidator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Action<P> {
    fields: BTreeMap<String, Value>,
    payload: Option<P>,
}

impl<P> Action<P> {
    /// Create an action with the given `type` and no payload
    pub fn new(action_type: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(TYPE_KEY.to_string(), Value::String(action_type.into()));
        Self {
            fields,
            payload: None,
        }
    }

    /// Create an action from arbitrary fields, without a payload
    ///
    /// A `payload` entry in `fields` is dropped; use [`Action::with_payload`].
    pub fn from_fields(fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(key, _)| key != PAYLOAD_KEY)
            .collect();
        Self {
            fields,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set a non-payload field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if key == PAYLOAD_KEY {
            log::warn!("Action::with_field: ignoring `payload`, use with_payload instead");
            return self;
        }
        self.fields.insert(key, value);
        self
    }

    pub fn with_meta(self, meta: Value) -> Self {
        self.with_field(META_KEY, meta)
    }

    pub fn with_error(self, error: bool) -> Self {
        self.with_field(ERROR_KEY, Value::Bool(error))
    }

    /// The `type` field, if present and a string
    pub fn action_type(&self) -> Option<&str> {
        self.fields.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// Any non-payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// All keys present on the action, `payload` included when set
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .map(String::as_str)
            .chain(self.payload.as_ref().map(|_| PAYLOAD_KEY))
    }

    /// `true` when the `error` field is exactly `true`
    ///
    /// This does not check well-formedness; see
    /// [`crate::MessageValidator::is_error`].
    pub fn is_error(&self) -> bool {
        matches!(self.fields.get(ERROR_KEY), Some(Value::Bool(true)))
    }

    /// Copy of this action with every field kept and the payload replaced
    pub fn replace_payload<Q>(&self, payload: Q) -> Action<Q> {
        Action {
            fields: self.fields.clone(),
            payload: Some(payload),
        }
    }

    pub fn map_payload<Q>(self, f: impl FnOnce(P) -> Q) -> Action<Q> {
        Action {
            fields: self.fields,
            payload: self.payload.map(f),
        }
    }

    pub fn into_payload(self) -> Option<P> {
        self.payload
    }
}

impl TryFrom<Value> for Action<Value> {
    type Error = ActionError;

    /// Convert a JSON object into an action
    ///
    /// An explicit `"payload": null` stays present as `Value::Null`.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(ActionError::NotAnObject(json_kind(&other))),
        };
        let payload = object.remove(PAYLOAD_KEY);
        Ok(Self {
            fields: object.into_iter().collect(),
            payload,
        })
    }
}

impl From<Action<Value>> for Value {
    fn from(action: Action<Value>) -> Self {
        let mut object: Map<String, Value> = action.fields.into_iter().collect();
        if let Some(payload) = action.payload {
            object.insert(PAYLOAD_KEY.to_string(), payload);
        }
        Value::Object(object)
    }
}

/// Human readable name of a JSON value's kind
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
