use serde_json::Value;

use crate::errors::AppError;
use crate::models::SendRequest;
use crate::services::sms::{mask_phone_number, SmsGateway};

pub const MISSING_FIELDS: &str = "to_number and message are required";

/// The single path every outbound SMS takes.
///
/// Wraps exactly one gateway for its lifetime. While `suppressed` is set
/// (debug mode) nothing leaves the process and `send` yields `None`.
pub struct SmsService {
    provider: Box<dyn SmsGateway>,
    suppressed: bool,
}

impl SmsService {
    pub fn new(provider: Box<dyn SmsGateway>, suppressed: bool) -> Self {
        Self {
            provider,
            suppressed,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub async fn send(&self, request: SendRequest) -> Result<Option<Value>, AppError> {
        if self.suppressed {
            tracing::warn!("SMS sending not available in debug mode");
            return Ok(None);
        }

        let (to_number, message) = request
            .required_fields()
            .ok_or_else(|| AppError::Validation(MISSING_FIELDS.to_string()))?;

        tracing::info!(
            provider = self.provider.provider_name(),
            to = %mask_phone_number(to_number),
            "dispatching SMS"
        );

        let resp = self
            .provider
            .send_sms(to_number, message, &request.extra)
            .await
            .map_err(AppError::Gateway)?;

        Ok(Some(resp))
    }
}
