//! Order service calls over HTTP against a mock backend

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use oms_client::notify::{InMemoryUiSink, UiEvent};
use oms_client::orders::{GENERIC_FAILURE_MESSAGE, REJECT_SUCCESS_MESSAGE};
use oms_client::{Error, RejectItemPayload};
use serde_json::json;

fn store_pickup_rejection() -> RejectItemPayload {
    serde_json::from_value(json!({
        "orderId": "10001",
        "shipmentMethodEnumId": "STOREPICKUP",
        "item": {
            "reason": "NOT_IN_STOCK",
            "facilityId": "STORE_1",
            "orderItemSeqId": "00101",
            "quantity": "2"
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_reject_item_sends_wrapped_params() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/api/rejectOrderItem")
            .match_body(Matcher::Json(json!({
                "payload": {
                    "orderId": "10001",
                    "rejectReason": "NOT_IN_STOCK",
                    "facilityId": "STORE_1",
                    "orderItemSeqId": "00101",
                    "shipmentMethodTypeId": "STOREPICKUP",
                    "quantity": 2,
                    "naFacilityId": "PICKUP_REJECTED"
                }
            })))
            .with_status(200)
            .with_body(r#"{"successMessage":"done"}"#)
            .create_async()
            .await
    };

    let sink = InMemoryUiSink::new();
    let resp = fixture
        .service()
        .reject_item_notified(&store_pickup_rejection(), &sink)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(!resp.has_error());
    assert_eq!(
        sink.events(),
        vec![
            UiEvent::PresentLoader,
            UiEvent::Toast(REJECT_SUCCESS_MESSAGE.into()),
            UiEvent::DismissLoader
        ]
    );
}

#[tokio::test]
async fn test_reject_item_backend_error_toasts_failure() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_post_json(
            "rejectOrderItem",
            200,
            &json!({"_ERROR_MESSAGE_": "Order item is already cancelled"}),
        )
        .await;

    let sink = InMemoryUiSink::new();
    let resp = fixture
        .service()
        .reject_item_notified(&store_pickup_rejection(), &sink)
        .await
        .unwrap();

    assert!(resp.has_error());
    assert_eq!(sink.toasts(), vec![GENERIC_FAILURE_MESSAGE.to_string()]);
    match resp.into_result() {
        Err(Error::Remote { message, .. }) => {
            assert_eq!(message, "Order item is already cancelled")
        }
        other => panic!("expected Remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_contact_details_served_from_cache() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_get_json(
            "orders/10001",
            &json!({"orderId": "10001", "email": "customer@example.com"}),
            1,
        )
        .await;

    let service = fixture.service();
    let first = service.get_customer_contact_details("10001").await.unwrap();
    let second = service.get_customer_contact_details("10001").await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.data["email"], "customer@example.com");
}

#[tokio::test]
async fn test_bearer_token_and_request_id_are_sent() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/api/solr-query")
            .match_header("authorization", "Bearer secret-token")
            .match_header("x-request-id", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"grouped":{}}"#)
            .create_async()
            .await
    };

    let service = fixture.service_with(fixture.config().with_token("secret-token"));
    let resp = service
        .get_open_orders(json!({"json": {"query": "*:*"}}))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.data, json!({"grouped": {}}));
}

#[tokio::test]
async fn test_create_picklist_posts_multipart() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/api/createPicklist")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(Matcher::Regex(r#"name="facilityId""#.to_string()))
            .with_status(200)
            .with_body(r#"{"picklistId":"PL_1"}"#)
            .create_async()
            .await
    };

    let resp = fixture
        .service()
        .create_picklist(vec![
            ("facilityId".into(), "STORE_1".into()),
            ("shipmentMethodTypeId".into(), "STANDARD".into()),
        ])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.data["picklistId"], "PL_1");
}

#[tokio::test]
async fn test_error_status_is_a_response_not_an_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/api/updateShipment")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await
    };

    let resp = fixture
        .service()
        .update_shipment(json!({"shipmentId": "SHIP_1"}))
        .await
        .unwrap();

    assert_eq!(resp.status, 502);
    assert!(resp.has_error());
    assert_eq!(resp.data, json!("<html>Bad Gateway</html>"));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let fixture = MockServerFixture::new().await;
    let service =
        fixture.service_with(oms_client::ClientConfig::new("http://127.0.0.1:1/api/"));
    let err = service
        .send_pickup_scheduled_notification(json!({"shipmentId": "SHIP_1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
