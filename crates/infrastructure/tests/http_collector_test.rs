#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use inventory_core::CollectorConfig;
    use inventory_domain::{InventoryCollector, InventoryError};
    use inventory_infrastructure::HttpCollector;
    use serde_json::{json, Value};

    async fn instances(
        Path(account): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        if params.get("state").map(String::as_str) != Some("running") {
            return Err(StatusCode::BAD_REQUEST);
        }
        if account == "broken" {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(Json(json!([
            {
                "InstanceId": "i-1",
                "SubnetId": "subnet-1",
                "Tags": [{"Key": "color", "Value": "red"}]
            },
            {"InstanceId": "i-2", "SubnetId": "subnet-2"}
        ])))
    }

    async fn subnets(Path(account): Path<String>) -> Json<Value> {
        if account == "garbled" {
            return Json(json!({"unexpected": true}));
        }
        Json(json!([
            {
                "SubnetId": "subnet-1",
                "VpcId": "vpc-1",
                "AvailabilityZone": "us-east-1a",
                "Tags": [{"Key": "Name", "Value": "private-a"}]
            }
        ]))
    }

    async fn start_proxy() -> String {
        let app = Router::new()
            .route("/v1/accounts/{account}/instances", get(instances))
            .route("/v1/accounts/{account}/subnets", get(subnets));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn collector(endpoint: &str, account_id: &str) -> HttpCollector {
        HttpCollector::new(&CollectorConfig {
            endpoint: endpoint.to_string(),
            account_id: account_id.to_string(),
            request_timeout_seconds: 5,
            ..CollectorConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_stamps_account_on_every_record() {
        let endpoint = start_proxy().await;
        let collector = collector(&endpoint, "A1");

        let instances = collector.fetch_instances("A1").await.unwrap();
        assert_eq!(instances.len(), 2);
        assert!(instances.iter().all(|i| i.account_id == "A1"));
        assert_eq!(instances[0].tag("color"), Some("red"));
        assert!(instances[1].tags.is_empty());

        let segments = collector.fetch_segments().await.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].account_id, "A1");
        assert_eq!(segments[0].tags.get("Name").map(String::as_str), Some("private-a"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_external_source_error() {
        let endpoint = start_proxy().await;
        let collector = collector(&endpoint, "broken");

        assert!(matches!(
            collector.fetch_instances("broken").await,
            Err(InventoryError::ExternalSource(_))
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_external_source_error() {
        let endpoint = start_proxy().await;
        let collector = collector(&endpoint, "garbled");

        assert!(matches!(
            collector.fetch_segments().await,
            Err(InventoryError::ExternalSource(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_external_source_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let collector = collector(&format!("http://{addr}"), "A1");
        assert!(matches!(
            collector.fetch_segments().await,
            Err(InventoryError::ExternalSource(_))
        ));
    }
}
