//! Intake messages from the live-data, settings and reset channels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MarqueeError, Result};
use crate::settings::SettingsUpdate;
use crate::types::RotationKey;

/// Live-data push for one rotation key.
///
/// Deserialisation goes through [`PushUpdate::from_value`], so every
/// transport gets the same key normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct PushUpdate {
    pub key: RotationKey,
    pub payload: Option<Value>,
}

impl TryFrom<Value> for PushUpdate {
    type Error = MarqueeError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl PushUpdate {
    pub fn new(key: impl Into<RotationKey>, payload: Value) -> Self {
        Self {
            key: key.into(),
            payload: Some(payload),
        }
    }

    /// A push carrying no usable data.
    pub fn empty(key: impl Into<RotationKey>) -> Self {
        Self {
            key: key.into(),
            payload: None,
        }
    }

    /// Parse a raw push. A missing or unparseable `key` is an error since
    /// the push cannot be attributed; a bad payload is not.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let key = value
            .get("key")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| MarqueeError::invalid("push update without a key"))?;
        Ok(Self {
            key: RotationKey::new(key),
            payload: value.get("payload").cloned(),
        })
    }

    /// Payload reduced to the data the cache keeps: objects pass through,
    /// anything else (missing, `null`, scalars, arrays) becomes `None`.
    pub fn sanitized_payload(self) -> (RotationKey, Option<Value>) {
        let payload = match self.payload {
            Some(Value::Object(map)) => Some(Value::Object(map)),
            Some(Value::Null) | None => None,
            Some(other) => {
                tracing::warn!(key = %self.key, kind = value_kind(&other), "Discarding malformed push payload");
                None
            }
        };
        (self.key, payload)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One line of the combined intake stream used by the CLI and by
/// transports that multiplex all three channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntakeEvent {
    Push(PushUpdate),
    Settings(SettingsUpdate),
    Reset,
}

impl IntakeEvent {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_without_key_is_rejected() {
        assert!(PushUpdate::from_json(r#"{"payload":{"name":"Ann"}}"#).is_err());
        assert!(PushUpdate::from_json(r#"{"key":"  "}"#).is_err());
        assert!(PushUpdate::from_json("not json").is_err());
    }

    #[test]
    fn malformed_payload_becomes_none() {
        let push = PushUpdate::from_json(r#"{"key":"gifter","payload":"Ann"}"#).unwrap();
        let (key, payload) = push.sanitized_payload();
        assert_eq!(key, "gifter");
        assert_eq!(payload, None);

        let push = PushUpdate::from_json(r#"{"key":"gifter"}"#).unwrap();
        assert_eq!(push.sanitized_payload().1, None);
    }

    #[test]
    fn object_payload_is_kept() {
        let push = PushUpdate::new("gifter", json!({"name": "Ann"}));
        assert_eq!(push.sanitized_payload().1, Some(json!({"name": "Ann"})));
    }

    #[test]
    fn intake_lines_are_tagged() {
        let event = IntakeEvent::from_json(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(event, IntakeEvent::Reset);

        let event =
            IntakeEvent::from_json(r#"{"type":"push","key":"like","payload":{"count":3}}"#)
                .unwrap();
        assert!(matches!(event, IntakeEvent::Push(p) if p.key == "like"));

        let event =
            IntakeEvent::from_json(r#"{"type":"settings","selectedKeys":["a"],"intervalSeconds":2}"#)
                .unwrap();
        assert!(matches!(event, IntakeEvent::Settings(s) if s.interval_ms() == Some(2_000)));
    }

    #[test]
    fn tagged_push_keys_are_normalised() {
        let event = IntakeEvent::from_json(r#"{"type":"push","key":" gifter ","payload":{}}"#)
            .unwrap();
        assert!(matches!(event, IntakeEvent::Push(p) if p.key == "gifter"));

        assert!(IntakeEvent::from_json(r#"{"type":"push","key":"  ","payload":{}}"#).is_err());
        assert!(IntakeEvent::from_json(r#"{"type":"push","payload":{}}"#).is_err());
    }
}
