#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use lakeview::api::{router, AppState, PATH_REQUIRED};
    use lakeview::metadata::{MetadataService, UnknownPathPolicy};
    use lakeview::store::{CatalogStore, MemoryStore};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(policy: UnknownPathPolicy) -> (Router, Arc<dyn CatalogStore>) {
        let state = AppState::new(MetadataService::demo(policy), MemoryStore::new());
        let store = Arc::clone(&state.store);
        (router(state), store)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_metadata_for_customer_data() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let (status, body) = get(
            app,
            "/api/metadata?path=s3://analytics-bucket/customer_data/",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["format"], "iceberg");
        assert_eq!(body["name"], "customer_profiles");
        assert_eq!(body["currentVersion"], "24");
        assert_eq!(body["versions"][0]["isLatest"], true);
        assert_eq!(body["schema"]["fields"][3]["partitionKey"], true);
    }

    #[tokio::test]
    async fn test_format_hint_selects_provider() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let (status, body) = get(
            app,
            "/api/metadata?path=s3://analytics-bucket/products/&format=parquet",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["format"], "parquet");
        assert!(body.get("currentVersion").is_none());
    }

    #[tokio::test]
    async fn test_unknown_path_lenient() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let (status, body) = get(app, "/api/metadata?path=s3://not/a/table/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"], "s3://analytics-bucket/customer_data/");
    }

    #[tokio::test]
    async fn test_unknown_path_strict() {
        let (app, _) = app(UnknownPathPolicy::Strict);
        let (status, body) = get(app, "/api/metadata?path=s3://not/a/table/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("s3://not/a/table/"));
    }

    #[tokio::test]
    async fn test_missing_path_is_bad_request() {
        for endpoint in [
            "/api/metadata",
            "/api/schema?path=",
            "/api/partitions?path=%20",
            "/api/versions",
            "/api/properties",
            "/api/sample-data",
            "/api/detect",
        ] {
            let (app, _) = app(UnknownPathPolicy::Lenient);
            let (status, body) = get(app, endpoint).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", endpoint);
            assert_eq!(body["error"], PATH_REQUIRED, "{}", endpoint);
        }
    }

    #[tokio::test]
    async fn test_slice_endpoints() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let path = "path=s3://data-warehouse/orders/";

        let (status, schema) = get(app.clone(), &format!("/api/schema?{}", path)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!schema["fields"].as_array().unwrap().is_empty());

        let (_, partitions) = get(app.clone(), &format!("/api/partitions?{}", path)).await;
        assert!(partitions.is_array());

        let (_, versions) = get(app.clone(), &format!("/api/versions?{}", path)).await;
        assert_eq!(versions[0]["isLatest"], true);

        let (_, properties) = get(app.clone(), &format!("/api/properties?{}", path)).await;
        assert_eq!(properties["format"], "hudi");

        let (_, rows) = get(app, &format!("/api/sample-data?{}", path)).await;
        assert!(rows[0].is_object());
    }

    #[tokio::test]
    async fn test_detect() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let (status, body) = get(
            app.clone(),
            "/api/detect?path=s3://analytics-bucket/transactions/",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["format"], "delta");

        let (_, body) = get(app, "/api/detect?path=s3://lake/x/.hoodie&format=avro").await;
        assert_eq!(body["format"], "hudi");
    }

    #[tokio::test]
    async fn test_user_id_records_recent_table() {
        let (app, store) = app(UnknownPathPolicy::Lenient);

        for _ in 0..2 {
            let (status, _) = get(
                app.clone(),
                "/api/metadata?path=s3://analytics-bucket/transactions/&userId=5",
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let recent = store.list_recent_tables(Some(5)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "transactions");
        assert_eq!(recent[0].path, "s3://analytics-bucket/transactions/");
        assert_eq!(recent[0].metadata["size"], 6_600_000_000u64);
        assert_eq!(recent[0].metadata["currentVersion"], "18");

        // Without a userId nothing is recorded
        get(app, "/api/metadata?path=s3://data-warehouse/orders/").await;
        assert_eq!(store.list_recent_tables(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_user_id() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let (status, body) = get(
            app,
            "/api/metadata?path=s3://analytics-bucket/transactions/&userId=abc",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid userId: 'abc'");
    }

    #[tokio::test]
    async fn test_list_tables() {
        let (app, _) = app(UnknownPathPolicy::Lenient);

        let (status, body) = get(app.clone(), "/api/tables").await;
        assert_eq!(status, StatusCode::OK);
        let tables = body.as_array().unwrap();
        assert_eq!(tables.len(), 4);
        assert_eq!(tables[0]["name"], "customer_profiles");
        assert_eq!(tables[0]["columnCount"], 7);
        assert_eq!(tables[0]["partitionCount"], 9);
        assert!(tables[0].get("schema").is_none());

        let (_, body) = get(app.clone(), "/api/tables?format=delta").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "transactions");

        let (status, body) = get(app.clone(), "/api/tables/format/HUDI").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["location"], "s3://data-warehouse/orders/");
    }

    #[tokio::test]
    async fn test_list_tables_rejects_unknown_format() {
        let (app, _) = app(UnknownPathPolicy::Lenient);

        let (status, body) = get(app.clone(), "/api/tables?format=orc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported table format: orc");

        let (status, _) = get(app, "/api/tables/format/orc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(UnknownPathPolicy::Lenient);
        let (status, body) = get(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
