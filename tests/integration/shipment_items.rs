//! Batched shipment-item lookups against a mock backend

use crate::mock_server::MockServerFixture;
use oms_client::Error;
use serde_json::{json, Value};

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("SHIP_{:03}", i)).collect()
}

fn batch_filter(ids: &[String]) -> Value {
    json!({
        "entityName": "ShipmentItem",
        "inputFields": {"shipmentId": ids},
        "viewSize": 250,
        "noConditionFind": "Y"
    })
}

fn docs(ids: &[String]) -> Value {
    let docs: Vec<Value> = ids
        .iter()
        .map(|id| json!({"shipmentId": id, "productId": "PROD_1", "shipmentItemSeqId": "00001"}))
        .collect();
    json!({ "docs": docs, "count": docs.len() })
}

#[tokio::test]
async fn test_forty_five_ids_three_batches_in_order() {
    let fixture = MockServerFixture::new().await;
    let all = ids(45);
    let mut mocks = Vec::new();
    for chunk in all.chunks(20) {
        let mock = fixture
            .mock_post_matching("performFind", batch_filter(chunk), 200, &docs(chunk))
            .await;
        mocks.push(mock);
    }

    let items = fixture.service().get_shipment_items(all.clone()).await.unwrap();

    for mock in &mocks {
        mock.assert_async().await;
    }
    let got: Vec<String> = items.into_iter().map(|i| i.shipment_id).collect();
    assert_eq!(got, all);
}

#[tokio::test]
async fn test_no_record_found_batch_contributes_nothing() {
    let fixture = MockServerFixture::new().await;
    let all = ids(45);
    let chunks: Vec<&[String]> = all.chunks(20).collect();

    let _first = fixture
        .mock_post_matching("performFind", batch_filter(chunks[0]), 200, &docs(chunks[0]))
        .await;
    let _second = fixture
        .mock_post_matching(
            "performFind",
            batch_filter(chunks[1]),
            200,
            &json!({"error": "No record found"}),
        )
        .await;
    let _third = fixture
        .mock_post_matching("performFind", batch_filter(chunks[2]), 200, &docs(chunks[2]))
        .await;

    let items = fixture.service().get_shipment_items(all.clone()).await.unwrap();
    assert_eq!(items.len(), 25);
    assert_eq!(items[19].shipment_id, "SHIP_019");
    assert_eq!(items[20].shipment_id, "SHIP_040");
}

#[tokio::test]
async fn test_backend_error_fails_whole_fetch() {
    let fixture = MockServerFixture::new().await;
    let all = ids(30);
    let chunks: Vec<&[String]> = all.chunks(20).collect();

    let _ok = fixture
        .mock_post_matching("performFind", batch_filter(chunks[0]), 200, &docs(chunks[0]))
        .await;
    let _boom = fixture
        .mock_post_matching(
            "performFind",
            batch_filter(chunks[1]),
            500,
            &json!({"error": "Entity engine unavailable"}),
        )
        .await;

    let err = fixture.service().get_shipment_items(all).await.unwrap_err();
    assert_eq!(err.failed_batches(), Some(vec![1]));
    match err {
        Error::BatchFailed { failed, responses } => {
            assert_eq!(failed[0].reason, "Entity engine unavailable");
            assert_eq!(responses.len(), 2);
            let first = responses[0].as_ref().unwrap();
            assert_eq!(first.data["docs"].as_array().unwrap().len(), 20);
            assert_eq!(responses[1].as_ref().unwrap().status, 500);
        }
        other => panic!("expected BatchFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_batch_failure() {
    let fixture = MockServerFixture::new().await;
    let config = oms_client::ClientConfig::new("http://127.0.0.1:1/api/");
    let err = fixture
        .service_with(config)
        .get_shipment_items(ids(3))
        .await
        .unwrap_err();
    match err {
        Error::BatchFailed { failed, responses } => {
            assert_eq!(failed.len(), 1);
            assert!(matches!(responses[0], Err(Error::Transport(_))));
        }
        other => panic!("expected BatchFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_ids_makes_no_requests() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/api/performFind")
            .expect(0)
            .create_async()
            .await
    };
    let items = fixture.service().get_shipment_items(Vec::new()).await.unwrap();
    assert!(items.is_empty());
    mock.assert_async().await;
}
