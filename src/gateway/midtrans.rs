// src/gateway/midtrans.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use super::{ChargeRequest, ChargeResponse, GatewayError, PaymentGateway, VirtualAccount};
use crate::models::payment::{PaymentMethod, PaymentStatus};

const CHARGE_PATH: &str = "/v2/charge";
const QR_ACTION: &str = "generate-qr-code";
// Gateway timestamps are Jakarta local time.
const GATEWAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Clone)]
pub struct MidtransClient {
    client: Client,
    server_key: String,
    base_url: String,
}

impl MidtransClient {
    pub fn new(server_key: String, base_url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            server_key,
            base_url,
        })
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
struct ChargeBody<'a> {
    payment_type: &'a str,
    transaction_details: TransactionDetails<'a>,
    customer_details: CustomerBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_transfer: Option<BankTransfer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qris: Option<Qris>,
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: Decimal,
}

#[derive(Debug, Serialize)]
struct CustomerBody<'a> {
    first_name: &'a str,
    email: &'a str,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct BankTransfer<'a> {
    bank: &'a str,
}

#[derive(Debug, Serialize)]
struct Qris {}

#[derive(Debug, Deserialize)]
struct ChargeReply {
    status_code: String,
    #[serde(default)]
    status_message: Option<String>,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    transaction_status: Option<String>,
    #[serde(default)]
    payment_type: Option<String>,
    #[serde(default)]
    transaction_time: Option<String>,
    #[serde(default)]
    fraud_status: Option<String>,
    #[serde(default)]
    approval_code: Option<String>,
    #[serde(default)]
    va_numbers: Vec<VaNumberReply>,
    #[serde(default)]
    actions: Vec<ActionReply>,
}

#[derive(Debug, Deserialize)]
struct VaNumberReply {
    bank: String,
    va_number: String,
}

#[derive(Debug, Deserialize)]
struct ActionReply {
    name: String,
    url: String,
}

fn build_body(request: &ChargeRequest) -> ChargeBody<'_> {
    ChargeBody {
        payment_type: request.method.as_str(),
        transaction_details: TransactionDetails {
            order_id: &request.order_id,
            gross_amount: request.amount,
        },
        customer_details: CustomerBody {
            first_name: &request.customer.name,
            email: &request.customer.email,
            phone: &request.customer.phone,
        },
        bank_transfer: match request.method {
            PaymentMethod::BankTransfer => request.bank.map(|b| BankTransfer { bank: b.as_str() }),
            _ => None,
        },
        qris: match request.method {
            PaymentMethod::Qris => Some(Qris {}),
            _ => None,
        },
    }
}

fn parse_transaction_time(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()?;
    let offset = FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

fn into_charge_response(reply: ChargeReply) -> Result<ChargeResponse, GatewayError> {
    let transaction_id = reply
        .transaction_id
        .ok_or_else(|| GatewayError::InvalidResponse("missing transaction_id".into()))?;

    let raw_status = reply
        .transaction_status
        .ok_or_else(|| GatewayError::InvalidResponse("missing transaction_status".into()))?;
    let status: PaymentStatus = raw_status
        .parse()
        .map_err(|_| GatewayError::InvalidResponse(format!("unknown status '{}'", raw_status)))?;

    let qr_redirect_url = reply
        .actions
        .into_iter()
        .find(|a| a.name == QR_ACTION)
        .map(|a| a.url);

    Ok(ChargeResponse {
        transaction_id,
        status,
        payment_type: reply.payment_type,
        va_numbers: reply
            .va_numbers
            .into_iter()
            .map(|v| VirtualAccount {
                bank: v.bank,
                va_number: v.va_number,
            })
            .collect(),
        qr_redirect_url,
        fraud_status: reply.fraud_status,
        approval_code: reply.approval_code,
        transaction_time: reply.transaction_time.as_deref().and_then(parse_transaction_time),
    })
}

fn signature_digest(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> Vec<u8> {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hasher.finalize().to_vec()
}

/// sha512(order_id + status_code + gross_amount + server_key), lowercase hex.
pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    hex::encode(signature_digest(order_id, status_code, gross_amount, server_key))
}

#[async_trait]
impl PaymentGateway for MidtransClient {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), CHARGE_PATH);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.server_key, None::<&str>)
            .header("Accept", "application/json")
            .header("Idempotency-Key", &request.order_id)
            .json(&build_body(request))
            .send()
            .await?;

        let http_status = response.status();
        let text = response.text().await?;

        let reply: ChargeReply = match serde_json::from_str(&text) {
            Ok(reply) => reply,
            Err(_) if !http_status.is_success() => {
                return Err(GatewayError::Rejected(format!("HTTP {}", http_status)));
            }
            Err(e) => return Err(GatewayError::InvalidResponse(e.to_string())),
        };

        if !http_status.is_success() || !matches!(reply.status_code.as_str(), "200" | "201") {
            let message = reply
                .status_message
                .unwrap_or_else(|| format!("status code {}", reply.status_code));
            return Err(GatewayError::Rejected(message));
        }

        into_charge_response(reply)
    }

    fn verify_notification(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature_key: &str,
    ) -> bool {
        let Ok(received) = hex::decode(signature_key) else {
            return false;
        };
        let expected = signature_digest(order_id, status_code, gross_amount, &self.server_key);
        expected.len() == received.len() && bool::from(expected.as_slice().ct_eq(received.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CustomerDetails;
    use crate::models::payment::Bank;

    fn request(method: PaymentMethod, bank: Option<Bank>) -> ChargeRequest {
        ChargeRequest {
            order_id: "ORDER-20250606-1a2b3c4d".into(),
            amount: Decimal::new(300000000, 2),
            method,
            bank,
            customer: CustomerDetails {
                name: "Ahmad".into(),
                email: "ahmad@example.com".into(),
                phone: "0812".into(),
            },
        }
    }

    #[test]
    fn bank_transfer_body_carries_bank_code() {
        let req = request(PaymentMethod::BankTransfer, Some(Bank::Bca));
        let json = serde_json::to_value(build_body(&req)).unwrap();
        assert_eq!(json["payment_type"], "bank_transfer");
        assert_eq!(json["bank_transfer"]["bank"], "bca");
        assert!(json.get("qris").is_none());
    }

    #[test]
    fn qris_body_requests_qr_code() {
        let req = request(PaymentMethod::Qris, None);
        let json = serde_json::to_value(build_body(&req)).unwrap();
        assert_eq!(json["payment_type"], "qris");
        assert!(json["qris"].is_object());
        assert!(json.get("bank_transfer").is_none());
    }

    #[test]
    fn transaction_time_is_converted_from_jakarta_time() {
        let parsed = parse_transaction_time("2025-06-06 10:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-06-06T03:00:00+00:00");
        assert!(parse_transaction_time("not a time").is_none());
    }

    const KNOWN_SIGNATURE: &str = "40be90c770dcb4f7b22f8a09457a26ac52c3ad982d4dd22c4d0ed31fd1b1dde77451845515f4dc47e80758e1c6b33cf4ee9edb7aa0fe50b3d43c5ff45a5316f7";

    fn client() -> MidtransClient {
        MidtransClient::new("key".into(), "http://localhost".into(), std::time::Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn signature_matches_known_vector() {
        let sig = notification_signature("ORDER-1", "200", "10000.00", "key");
        assert_eq!(sig, KNOWN_SIGNATURE);
        assert_ne!(sig, notification_signature("ORDER-1", "200", "10000.01", "key"));
    }

    #[test]
    fn verify_accepts_known_vector_in_either_case() {
        let client = client();
        assert!(client.verify_notification("ORDER-1", "200", "10000.00", KNOWN_SIGNATURE));
        assert!(client.verify_notification("ORDER-1", "200", "10000.00", &KNOWN_SIGNATURE.to_uppercase()));
    }

    #[test]
    fn verify_rejects_tampered_truncated_or_malformed_signatures() {
        let client = client();
        assert!(!client.verify_notification("ORDER-1", "200", "10000.01", KNOWN_SIGNATURE));
        assert!(!client.verify_notification("ORDER-1", "200", "10000.00", &KNOWN_SIGNATURE[..64]));
        assert!(!client.verify_notification("ORDER-1", "200", "10000.00", "not hex at all"));
        assert!(!client.verify_notification("ORDER-1", "200", "10000.00", ""));
    }
}
