pub mod kaleyra;

use async_trait::async_trait;
use serde_json::Value;

/// Provider-specific options passed through alongside a message.
pub type ExtraParams = serde_json::Map<String, Value>;

/// A vendor integration that can deliver one text message.
///
/// Implementations always attempt delivery when called; suppression lives in
/// [`crate::services::dispatch::SmsService`].
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(
        &self,
        to_number: &str,
        message: &str,
        extra: &ExtraParams,
    ) -> anyhow::Result<Value>;

    fn provider_name(&self) -> &'static str;
}

/// Keeps only the last four digits, e.g. `+********7890`.
pub fn mask_phone_number(phone: &str) -> String {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits <= 4 {
        return "*".repeat(phone.chars().count());
    }

    let mut seen = 0;
    let keep_from = digits - 4;
    phone
        .chars()
        .map(|c| {
            if !c.is_ascii_digit() {
                return c;
            }
            seen += 1;
            if seen > keep_from {
                c
            } else {
                '*'
            }
        })
        .collect()
}
