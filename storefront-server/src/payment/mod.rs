//! Payment Gateway Adapter
//!
//! Hosted-checkout integration: we redirect the buyer to the gateway with
//! a signed parameter set and receive a signed callback when payment
//! settles. The order id rides in the dedicated `vnp_TxnRef` field, never
//! inside free-text, so the callback identifies its order without string
//! parsing.
//!
//! Signing is HMAC-SHA512 over the sorted, percent-encoded parameter
//! string, hex-lowercase. The callback is verified with the same
//! construction before any field is trusted.

use std::collections::{BTreeMap, HashMap};

use reqwest::Url;
use ring::hmac;
use thiserror::Error;

const SIGNATURE_PARAM: &str = "vnp_SecureHash";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing callback parameter: {0}")]
    MissingParam(&'static str),

    #[error("Invalid callback signature")]
    InvalidSignature,

    #[error("Malformed callback parameter {0}: {1}")]
    Malformed(&'static str, String),

    #[error("Invalid gateway URL: {0}")]
    Url(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway credentials and endpoints
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Merchant code issued by the gateway (`vnp_TmnCode`)
    pub merchant_code: String,
    /// Shared HMAC secret
    pub secret_key: String,
    /// Hosted checkout page
    pub pay_url: String,
    /// Where the gateway sends the buyer back
    pub return_url: String,
}

/// Verified callback payload
#[derive(Debug, Clone)]
pub struct CallbackData {
    /// Order id carried in `vnp_TxnRef`
    pub order_ref: i64,
    /// Gateway transaction number
    pub transaction_id: String,
    /// Amount in minor units (currency x 100)
    pub amount_minor: i64,
    /// Raw gateway response code
    pub response_code: String,
    /// `true` when the gateway reports code `00`
    pub success: bool,
}

impl CallbackData {
    pub fn amount(&self) -> f64 {
        self.amount_minor as f64 / 100.0
    }
}

/// Signs redirect parameters and verifies settlement callbacks
#[derive(Clone)]
pub struct PaymentGateway {
    config: GatewayConfig,
}

impl PaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Build the hosted-checkout redirect URL for an order.
    ///
    /// `amount` is in currency units; the gateway wire format wants minor
    /// units, so it is multiplied by 100 here and divided back on the
    /// callback path.
    pub fn build_redirect_url(
        &self,
        order_id: i64,
        amount: f64,
        order_info: &str,
    ) -> GatewayResult<String> {
        let create_date = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
        let amount_minor = (amount * 100.0).round() as i64;

        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("vnp_Version".into(), "2.1.0".into());
        params.insert("vnp_Command".into(), "pay".into());
        params.insert("vnp_TmnCode".into(), self.config.merchant_code.clone());
        params.insert("vnp_Amount".into(), amount_minor.to_string());
        params.insert("vnp_CurrCode".into(), "VND".into());
        params.insert("vnp_TxnRef".into(), order_id.to_string());
        params.insert("vnp_OrderInfo".into(), order_info.into());
        params.insert("vnp_OrderType".into(), "other".into());
        params.insert("vnp_Locale".into(), "vn".into());
        params.insert("vnp_ReturnUrl".into(), self.config.return_url.clone());
        params.insert("vnp_CreateDate".into(), create_date);

        let canonical = canonical_query(&params)?;
        let signature = self.sign(&canonical);

        let mut url = Url::parse(&self.config.pay_url)
            .map_err(|e| GatewayError::Url(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair(SIGNATURE_PARAM, &signature);
        }
        Ok(url.to_string())
    }

    /// Verify a settlement callback and extract its payload.
    ///
    /// The signature check runs before any field is read; a tampered or
    /// unsigned callback never reaches order state.
    pub fn parse_callback(&self, query: &HashMap<String, String>) -> GatewayResult<CallbackData> {
        let provided = query
            .get(SIGNATURE_PARAM)
            .ok_or(GatewayError::MissingParam(SIGNATURE_PARAM))?;

        let params: BTreeMap<String, String> = query
            .iter()
            .filter(|(k, _)| k.as_str() != SIGNATURE_PARAM)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let canonical = canonical_query(&params)?;
        self.verify(&canonical, provided)?;

        let order_ref_raw = require(&params, "vnp_TxnRef")?;
        let order_ref: i64 = order_ref_raw
            .parse()
            .map_err(|_| GatewayError::Malformed("vnp_TxnRef", order_ref_raw.clone()))?;

        let amount_raw = require(&params, "vnp_Amount")?;
        let amount_minor: i64 = amount_raw
            .parse()
            .map_err(|_| GatewayError::Malformed("vnp_Amount", amount_raw.clone()))?;

        let response_code = require(&params, "vnp_ResponseCode")?.clone();
        let transaction_id = require(&params, "vnp_TransactionNo")?.clone();

        Ok(CallbackData {
            order_ref,
            transaction_id,
            amount_minor,
            success: response_code == "00",
            response_code,
        })
    }

    fn sign(&self, canonical: &str) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA512, self.config.secret_key.as_bytes());
        let tag = hmac::sign(&key, canonical.as_bytes());
        hex::encode(tag.as_ref())
    }

    fn verify(&self, canonical: &str, provided: &str) -> GatewayResult<()> {
        let provided = hex::decode(provided).map_err(|_| GatewayError::InvalidSignature)?;
        let key = hmac::Key::new(hmac::HMAC_SHA512, self.config.secret_key.as_bytes());
        hmac::verify(&key, canonical.as_bytes(), &provided)
            .map_err(|_| GatewayError::InvalidSignature)
    }
}

/// Fetch a required callback parameter or report it missing by name.
fn require<'a>(
    params: &'a BTreeMap<String, String>,
    key: &'static str,
) -> GatewayResult<&'a String> {
    params.get(key).ok_or(GatewayError::MissingParam(key))
}

/// Sorted `k=v&` string with the gateway's percent-encoding, the exact
/// bytes both sides sign
fn canonical_query(params: &BTreeMap<String, String>) -> GatewayResult<String> {
    let mut url = Url::parse("https://canonical.invalid/")
        .map_err(|e| GatewayError::Url(e.to_string()))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url.query().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(GatewayConfig {
            merchant_code: "DEMO01".into(),
            secret_key: "topsecret".into(),
            pay_url: "https://pay.example.com/checkout".into(),
            return_url: "https://shop.example.com/payment/callback".into(),
        })
    }

    fn signed_callback(gw: &PaymentGateway, mutate: impl FnOnce(&mut BTreeMap<String, String>)) -> HashMap<String, String> {
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("vnp_TxnRef".into(), "42".into());
        params.insert("vnp_Amount".into(), "15000000".into());
        params.insert("vnp_ResponseCode".into(), "00".into());
        params.insert("vnp_TransactionNo".into(), "GW123456".into());
        mutate(&mut params);
        let signature = gw.sign(&canonical_query(&params).unwrap());
        let mut query: HashMap<String, String> = params.into_iter().collect();
        query.insert(SIGNATURE_PARAM.into(), signature);
        query
    }

    #[test]
    fn redirect_url_is_signed_and_carries_order_ref() {
        let gw = gateway();
        let url = gw.build_redirect_url(42, 150_000.0, "Order 42").unwrap();
        assert!(url.starts_with("https://pay.example.com/checkout?"));
        assert!(url.contains("vnp_TxnRef=42"));
        assert!(url.contains("vnp_Amount=15000000"));
        assert!(url.contains("vnp_SecureHash="));
    }

    #[test]
    fn callback_roundtrip_verifies() {
        let gw = gateway();
        let query = signed_callback(&gw, |_| {});
        let data = gw.parse_callback(&query).unwrap();
        assert_eq!(data.order_ref, 42);
        assert_eq!(data.transaction_id, "GW123456");
        assert_eq!(data.amount(), 150_000.0);
        assert!(data.success);
    }

    #[test]
    fn failure_code_is_not_success() {
        let gw = gateway();
        let query = signed_callback(&gw, |p| {
            p.insert("vnp_ResponseCode".into(), "24".into());
        });
        let data = gw.parse_callback(&query).unwrap();
        assert!(!data.success);
        assert_eq!(data.response_code, "24");
    }

    #[test]
    fn tampered_amount_is_rejected() {
        let gw = gateway();
        let mut query = signed_callback(&gw, |_| {});
        query.insert("vnp_Amount".into(), "1".into());
        assert!(matches!(
            gw.parse_callback(&query).unwrap_err(),
            GatewayError::InvalidSignature
        ));
    }

    #[test]
    fn missing_signature_is_rejected() {
        let gw = gateway();
        let mut query = signed_callback(&gw, |_| {});
        query.remove(SIGNATURE_PARAM);
        assert!(matches!(
            gw.parse_callback(&query).unwrap_err(),
            GatewayError::MissingParam(SIGNATURE_PARAM)
        ));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let gw = gateway();
        let other = PaymentGateway::new(GatewayConfig {
            secret_key: "othersecret".into(),
            ..gw.config.clone()
        });
        let query = signed_callback(&gw, |_| {});
        assert!(matches!(
            other.parse_callback(&query).unwrap_err(),
            GatewayError::InvalidSignature
        ));
    }
}
