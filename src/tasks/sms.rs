use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{TaskHandler, TaskRegistry};
use crate::errors::AppError;
use crate::models::sms::{phone_number_lenient, SendRequest};
use crate::services::SmsService;

/// Stable name callers enqueue the SMS task under.
pub const SEND_SMS: &str = "services.sms.send_sms";

/// The task's whole argument list; nothing else is forwarded.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SendSmsArgs {
    #[serde(default, deserialize_with = "phone_number_lenient")]
    pub to_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct SendSmsTask {
    service: Arc<SmsService>,
}

impl SendSmsTask {
    pub fn new(service: Arc<SmsService>) -> Self {
        Self { service }
    }

    pub fn register(registry: &mut TaskRegistry, service: Arc<SmsService>) {
        registry.register(SEND_SMS, Arc::new(Self::new(service)));
    }
}

#[async_trait]
impl TaskHandler for SendSmsTask {
    async fn run(&self, args: Value) -> Result<Value, AppError> {
        let args: SendSmsArgs = if args.is_null() {
            SendSmsArgs::default()
        } else {
            serde_json::from_value(args)
                .map_err(|e| AppError::Validation(format!("invalid {SEND_SMS} arguments: {e}")))?
        };

        let request = SendRequest {
            to_number: args.to_number,
            message: args.message,
            ..SendRequest::default()
        };

        Ok(self.service.send(request).await?.unwrap_or(Value::Null))
    }
}
