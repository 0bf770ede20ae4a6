#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use lakeview::api::{router, AppState};
    use lakeview::client::{ClientError, MetadataClient, RetryPolicy};
    use lakeview::metadata::{DemoCatalog, MetadataService, UnknownPathPolicy};
    use lakeview::model::{NewDataSource, TableFormat, TableMetadata};
    use lakeview::store::MemoryStore;
    use serde_json::{json, Value};

    const TRANSACTIONS: &str = "s3://analytics-bucket/transactions/";

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_lakeview() -> String {
        spawn(router(AppState::new(
            MetadataService::demo(UnknownPathPolicy::Lenient),
            MemoryStore::new(),
        )))
        .await
    }

    fn fast_retry(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        }
    }

    #[derive(Clone, Default)]
    struct Counters {
        metadata: Arc<AtomicUsize>,
        recent: Arc<AtomicUsize>,
    }

    /// Slow metadata endpoint and a recent-tables endpoint that fails once.
    fn scripted_app(counters: Counters) -> Router {
        async fn metadata(State(counters): State<Counters>) -> Json<TableMetadata> {
            counters.metadata.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            let catalog = DemoCatalog::new();
            Json(catalog.get(TRANSACTIONS).cloned().unwrap())
        }

        async fn recent(State(counters): State<Counters>) -> (StatusCode, Json<Value>) {
            if counters.recent.fetch_add(1, Ordering::SeqCst) == 0 {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": "warming up"})),
                )
            } else {
                (StatusCode::OK, Json(json!([])))
            }
        }

        async fn slow() -> Json<Value> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([]))
        }

        Router::new()
            .route("/api/metadata", get(metadata))
            .route("/api/recent-tables", get(recent))
            .route("/api/datasources", get(slow))
            .with_state(counters)
    }

    #[tokio::test]
    async fn test_table_metadata_round_trip() {
        let client = MetadataClient::new(spawn_lakeview().await).unwrap();

        let table = client
            .table_metadata("s3://analytics-bucket/customer_data/", None, None)
            .await
            .unwrap();
        assert_eq!(table.format, TableFormat::Iceberg);
        assert!(table.latest_version().is_some());

        let detected = client.detect(TRANSACTIONS, None).await.unwrap();
        assert_eq!(detected.format, TableFormat::Delta);

        let versions = client
            .versions(TRANSACTIONS, Some(TableFormat::Delta))
            .await
            .unwrap();
        assert!(versions[0].is_latest);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_deduplicated() {
        let counters = Counters::default();
        let base_url = spawn(scripted_app(counters.clone())).await;
        let client = MetadataClient::new(base_url).unwrap();

        let (a, b, c) = tokio::join!(
            client.table_metadata(TRANSACTIONS, None, None),
            client.table_metadata(TRANSACTIONS, None, None),
            client.table_metadata(TRANSACTIONS, None, None),
        );
        assert_eq!(a.unwrap().name, "transactions");
        assert!(b.is_ok() && c.is_ok());
        assert_eq!(counters.metadata.load(Ordering::SeqCst), 1);

        // Fresh cache answers without a request
        client.table_metadata(TRANSACTIONS, None, None).await.unwrap();
        assert_eq!(counters.metadata.load(Ordering::SeqCst), 1);

        // A different format hint is a different query
        client
            .table_metadata(TRANSACTIONS, Some(TableFormat::Delta), None)
            .await
            .unwrap();
        assert_eq!(counters.metadata.load(Ordering::SeqCst), 2);

        client.clear_cache().await;
        client.table_metadata(TRANSACTIONS, None, None).await.unwrap();
        assert_eq!(counters.metadata.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let counters = Counters::default();
        let base_url = spawn(scripted_app(counters.clone())).await;
        let client = MetadataClient::new(base_url)
            .unwrap()
            .with_retry(fast_retry(2));

        let recent = client.recent_tables(Some(1)).await.unwrap();
        assert!(recent.is_empty());
        assert_eq!(counters.recent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let counters = Counters::default();
        let base_url = spawn(scripted_app(counters.clone())).await;
        let client = MetadataClient::new(base_url)
            .unwrap()
            .with_retry(RetryPolicy::none());

        let err = client.recent_tables(None).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Status {
                status: 503,
                message: "warming up".to_string()
            }
        );
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let base_url = spawn(scripted_app(Counters::default())).await;
        let client = MetadataClient::new(base_url)
            .unwrap()
            .with_timeout(Duration::from_millis(50))
            .with_retry(RetryPolicy::none());

        let err = client.data_sources(None).await.unwrap_err();
        assert_eq!(err, ClientError::Timeout(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_bad_request_not_retried() {
        let client = MetadataClient::new(spawn_lakeview().await)
            .unwrap()
            .with_retry(fast_retry(3));

        let err = client.schema("  ", None).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Status {
                status: 400,
                message: "Path parameter is required".to_string()
            }
        );
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_data_source_mutations_invalidate_cache() {
        let client = MetadataClient::new(spawn_lakeview().await).unwrap();

        assert!(client.data_sources(None).await.unwrap().is_empty());

        let created = client
            .create_data_source(&NewDataSource::new("Lake", "s3://lake/").for_user(4))
            .await
            .unwrap();
        assert_eq!(created.user_id, Some(4));

        let sources = client.data_sources(None).await.unwrap();
        assert_eq!(sources, vec![created.clone()]);

        assert!(client.delete_data_source(created.id).await.unwrap());
        assert!(client.data_sources(None).await.unwrap().is_empty());
        assert!(!client.delete_data_source(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_viewing_with_user_refreshes_recent_tables() {
        let client = MetadataClient::new(spawn_lakeview().await).unwrap();

        assert!(client.recent_tables(Some(9)).await.unwrap().is_empty());
        client
            .table_metadata(TRANSACTIONS, None, Some(9))
            .await
            .unwrap();

        let recent = client.recent_tables(Some(9)).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].format, TableFormat::Delta);
    }

    #[tokio::test]
    async fn test_user_view_after_anonymous_view_is_recorded() {
        let client = MetadataClient::new(spawn_lakeview().await).unwrap();

        client.table_metadata(TRANSACTIONS, None, None).await.unwrap();
        assert!(client.recent_tables(Some(7)).await.unwrap().is_empty());

        // The anonymous result is still fresh; the user view must reach the server
        client
            .table_metadata(TRANSACTIONS, None, Some(7))
            .await
            .unwrap();

        let recent = client.recent_tables(Some(7)).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].path, TRANSACTIONS);
    }

    #[tokio::test]
    async fn test_list_tables() {
        let client = MetadataClient::new(spawn_lakeview().await).unwrap();

        assert_eq!(client.tables(None).await.unwrap().len(), 4);
        let parquet = client.tables(Some(TableFormat::Parquet)).await.unwrap();
        assert_eq!(parquet.len(), 1);
        assert_eq!(parquet[0].name, "product_catalog");
        assert_eq!(parquet[0].current_version, None);
    }

    #[tokio::test]
    async fn test_health() {
        let client = MetadataClient::new(spawn_lakeview().await).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health["status"], "ok");
    }
}
