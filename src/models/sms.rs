use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::services::sms::ExtraParams;

/// A single outbound text message as handed to the dispatch service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendRequest {
    #[serde(default, deserialize_with = "phone_number_lenient")]
    pub to_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: ExtraParams,
}

impl SendRequest {
    pub fn new(to_number: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            to_number: Some(to_number.into()),
            message: Some(message.into()),
            extra: ExtraParams::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Both fields present and non-empty, returned exactly as given.
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let to = self.to_number.as_deref().filter(|s| !s.is_empty())?;
        let message = self.message.as_deref().filter(|s| !s.is_empty())?;
        Some((to, message))
    }
}

/// Accepts a phone number sent as a JSON string or a bare number.
pub fn phone_number_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "to_number must be a string or number, got {other}"
        ))),
    }
}
