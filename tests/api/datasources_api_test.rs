#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use lakeview::api::{router, AppState};
    use lakeview::metadata::{DemoCatalog, MetadataService, UnknownPathPolicy};
    use lakeview::store::{seed_demo, MemoryStore, DEMO_USER_ID};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(
            MetadataService::demo(UnknownPathPolicy::Lenient),
            MemoryStore::new(),
        ))
    }

    fn seeded_app() -> Router {
        let store = MemoryStore::new();
        seed_demo(&store, &DemoCatalog::new()).unwrap();
        router(AppState::new(
            MetadataService::demo(UnknownPathPolicy::Lenient),
            store,
        ))
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_create_stamps_id_and_created_at() {
        let app = app();
        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/api/datasources",
            Some(json!({"name": "Lake", "path": "s3://lake/", "type": "s3", "userId": 2})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["name"], "Lake");
        assert_eq!(created["userId"], 2);
        assert!(created["createdAt"].is_string());

        let (status, listed) = send(app, Method::GET, "/api/datasources?userId=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn test_create_requires_name_and_path() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/api/datasources",
            Some(json!({"name": "", "path": "s3://lake/"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Required field is empty: name");

        let (status, body) = send(
            app(),
            Method::POST,
            "/api/datasources",
            Some(json!({"name": "Lake"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete() {
        let app = app();
        send(
            app.clone(),
            Method::POST,
            "/api/datasources",
            Some(json!({"name": "Lake", "path": "s3://lake/"})),
        )
        .await;

        let (status, body) = send(app.clone(), Method::DELETE, "/api/datasources/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = send(app.clone(), Method::DELETE, "/api/datasources/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Data source 1 not found");

        let (status, body) = send(app, Method::DELETE, "/api/datasources/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_seeded_lists() {
        let app = seeded_app();

        let uri = format!("/api/datasources?userId={}", DEMO_USER_ID);
        let (_, sources) = send(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(sources.as_array().unwrap().len(), 3);
        assert_eq!(sources[0]["name"], "analytics-bucket");

        let (_, other) = send(app.clone(), Method::GET, "/api/datasources?userId=99", None).await;
        assert_eq!(other, json!([]));

        let (status, recent) = send(app, Method::GET, "/api/recent-tables", None).await;
        assert_eq!(status, StatusCode::OK);
        let recent = recent.as_array().unwrap();
        assert_eq!(recent.len(), 4);
        // Most recently modified table was viewed last
        assert!(recent[0]["lastViewed"].as_str() > recent[1]["lastViewed"].as_str());
    }

    #[tokio::test]
    async fn test_viewing_moves_table_to_front() {
        let app = seeded_app();

        let (_, before) = send(app.clone(), Method::GET, "/api/recent-tables?userId=1", None).await;
        let last = before[3]["path"].as_str().unwrap().to_string();

        let uri = format!("/api/metadata?path={}&userId=1", last);
        let (status, _) = send(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, after) = send(app, Method::GET, "/api/recent-tables?userId=1", None).await;
        assert_eq!(after.as_array().unwrap().len(), 4);
        assert_eq!(after[0]["path"], last.as_str());
        assert_eq!(after[0]["id"], before[3]["id"]);
    }

    #[tokio::test]
    async fn test_invalid_user_id_on_lists() {
        let (status, body) = send(app(), Method::GET, "/api/recent-tables?userId=x", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid userId: 'x'");
    }
}
