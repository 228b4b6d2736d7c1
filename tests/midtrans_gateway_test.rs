// tests/midtrans_gateway_test.rs

use std::time::Duration;

use kurban_backend::{
    gateway::{ChargeRequest, CustomerDetails, GatewayError, MidtransClient, PaymentGateway},
    models::payment::{Bank, PaymentMethod, PaymentStatus},
};
use rust_decimal::Decimal;

const ORDER_ID: &str = "ORDER-20250606-1a2b3c4d";

fn charge_request(method: PaymentMethod, bank: Option<Bank>) -> ChargeRequest {
    ChargeRequest {
        order_id: ORDER_ID.to_string(),
        amount: Decimal::new(300000000, 2),
        method,
        bank,
        customer: CustomerDetails {
            name: "Ahmad".to_string(),
            email: "ahmad@example.com".to_string(),
            phone: "081234567890".to_string(),
        },
    }
}

fn client(base_url: String) -> MidtransClient {
    MidtransClient::new("SB-Mid-server-test".to_string(), base_url, Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn bank_transfer_charge_returns_virtual_account() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v2/charge")
        .match_header("idempotency-key", ORDER_ID)
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"payment_type":"bank_transfer","bank_transfer":{"bank":"bca"}}"#.to_string(),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "status_code": "201",
                "status_message": "Success, Bank Transfer transaction is created",
                "transaction_id": "9aed5972-5b6a-401e-894b-a32c91ed1a3a",
                "order_id": "ORDER-20250606-1a2b3c4d",
                "gross_amount": "3000000.00",
                "payment_type": "bank_transfer",
                "transaction_time": "2025-06-06 10:00:00",
                "transaction_status": "pending",
                "fraud_status": "accept",
                "va_numbers": [{ "bank": "bca", "va_number": "812785002530231" }]
            }"#,
        )
        .create_async()
        .await;

    let response = client(server.url())
        .charge(&charge_request(PaymentMethod::BankTransfer, Some(Bank::Bca)))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.transaction_id, "9aed5972-5b6a-401e-894b-a32c91ed1a3a");
    assert_eq!(response.status, PaymentStatus::Pending);
    assert_eq!(response.va_numbers.len(), 1);
    assert_eq!(response.va_numbers[0].va_number, "812785002530231");
    assert!(response.qr_redirect_url.is_none());
    assert!(response.transaction_time.is_some());
}

#[tokio::test]
async fn qris_charge_exposes_qr_action_url() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/v2/charge")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "status_code": "201",
                "transaction_id": "b1f2c3d4",
                "transaction_status": "pending",
                "payment_type": "qris",
                "actions": [
                    { "name": "generate-qr-code", "method": "GET", "url": "https://api.sandbox.midtrans.com/v2/qris/b1f2c3d4/qr-code" },
                    { "name": "get-status", "method": "GET", "url": "https://api.sandbox.midtrans.com/v2/b1f2c3d4/status" }
                ]
            }"#,
        )
        .create_async()
        .await;

    let response = client(server.url())
        .charge(&charge_request(PaymentMethod::Qris, None))
        .await
        .unwrap();

    assert_eq!(
        response.qr_redirect_url.as_deref(),
        Some("https://api.sandbox.midtrans.com/v2/qris/b1f2c3d4/qr-code")
    );
    assert!(response.va_numbers.is_empty());
}

#[tokio::test]
async fn gateway_error_status_is_rejected() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/v2/charge")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "status_code": "406", "status_message": "Duplicate order ID" }"#)
        .create_async()
        .await;

    let result = client(server.url())
        .charge(&charge_request(PaymentMethod::Gopay, None))
        .await;

    match result {
        Err(GatewayError::Rejected(message)) => assert!(message.contains("Duplicate")),
        other => panic!("expected rejection, got {:?}", other.map(|r| r.transaction_id)),
    }
}

#[tokio::test]
async fn non_json_failure_is_rejected_with_http_status() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/v2/charge")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let result = client(server.url())
        .charge(&charge_request(PaymentMethod::Qris, None))
        .await;

    assert!(matches!(result, Err(GatewayError::Rejected(_))));
}

#[test]
fn notification_signature_is_checked_against_server_key() {
    let client = client("http://localhost".to_string());
    let signature = kurban_backend::gateway::midtrans::notification_signature(
        ORDER_ID,
        "200",
        "3000000.00",
        "SB-Mid-server-test",
    );

    assert!(client.verify_notification(ORDER_ID, "200", "3000000.00", &signature));
    assert!(!client.verify_notification(ORDER_ID, "200", "3000001.00", &signature));
    assert!(!client.verify_notification(ORDER_ID, "200", "3000000.00", "deadbeef"));
}
