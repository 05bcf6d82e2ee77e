use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::{mask_phone_number, ExtraParams, SmsGateway};
use crate::config::KaleyraConfig;

/// Kaleyra alerts API (v4), `method=sms`.
///
/// Credentials left unset in the config are dropped from the query string
/// and the vendor reports the failure in its response.
pub struct KaleyraGateway {
    config: KaleyraConfig,
    client: reqwest::Client,
}

impl KaleyraGateway {
    pub fn new(config: KaleyraConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn query<'a>(&'a self, to_number: &'a str, message: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("method", self.config.method.as_str())];
        if let Some(api_key) = self.config.api_key.as_deref() {
            params.push(("api_key", api_key));
        }
        if let Some(sender) = self.config.sender_id.as_deref() {
            params.push(("sender", sender));
        }
        params.push(("to", to_number));
        params.push(("message", message));
        params
    }
}

#[async_trait]
impl SmsGateway for KaleyraGateway {
    async fn send_sms(
        &self,
        to_number: &str,
        message: &str,
        _extra: &ExtraParams,
    ) -> anyhow::Result<Value> {
        tracing::debug!(to = %mask_phone_number(to_number), "sending SMS via Kaleyra");

        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&self.query(to_number, message))
            .send()
            .await
            .context("failed to call Kaleyra API")?
            .error_for_status()
            .context("Kaleyra API returned error")?;

        resp.json::<Value>()
            .await
            .context("failed to parse Kaleyra response")
    }

    fn provider_name(&self) -> &'static str {
        "kaleyra"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(api_key: Option<&str>, sender_id: Option<&str>) -> KaleyraGateway {
        KaleyraGateway::new(KaleyraConfig {
            api_key: api_key.map(String::from),
            sender_id: sender_id.map(String::from),
            ..KaleyraConfig::default()
        })
    }

    #[test]
    fn query_has_all_five_params_in_order() {
        let gw = gateway(Some("key"), Some("NOAH"));
        assert_eq!(
            gw.query("+911234567890", "hello"),
            vec![
                ("method", "sms"),
                ("api_key", "key"),
                ("sender", "NOAH"),
                ("to", "+911234567890"),
                ("message", "hello"),
            ]
        );
    }

    #[test]
    fn unset_credentials_are_omitted() {
        let gw = gateway(None, None);
        let keys: Vec<_> = gw.query("1", "m").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["method", "to", "message"]);
    }
}
