//! Gateway Module Tests
//!
//! Exercises the translator against an in-process fake backend that can be
//! switched between reachable and unreachable.
//!
//! ## Test Scopes
//! - **Projection**: Default substitution for backend records.
//! - **Validation**: Bad input is rejected before any backend or store access.
//! - **Fallback**: Every entry operation degrades to the store on backend failure.
//! - **Passthrough policy**: With fallback disabled, backend errors surface as 500.
//! - **Panics**: A panicking handler still answers `500 {error}` over HTTP.

#[cfg(test)]
mod tests {
    use crate::gateway::envelope::{EntryView, entry_details, project_record};
    use crate::gateway::error::GatewayError;
    use crate::gateway::protocol::{EntryPayload, ListParams};
    use crate::gateway::routes::router;
    use crate::gateway::service::Gateway;
    use crate::journal::store::FallbackStore;
    use crate::rpc::backend::ObjectBackend;
    use crate::rpc::client::RpcError;
    use crate::rpc::protocol::{Details, ObjectRecord, SearchFilter};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ============================================================
    // FAKE BACKEND
    // ============================================================

    struct FakeBackend {
        reachable: bool,
        calls: AtomicUsize,
        records: Vec<ObjectRecord>,
    }

    impl FakeBackend {
        fn up(records: Vec<ObjectRecord>) -> Arc<Self> {
            Arc::new(Self {
                reachable: true,
                calls: AtomicUsize::new(0),
                records,
            })
        }

        fn down() -> Arc<Self> {
            Arc::new(Self {
                reachable: false,
                calls: AtomicUsize::new(0),
                records: Vec::new(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<(), RpcError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reachable {
                Ok(())
            } else {
                Err(RpcError::Unreachable("connection refused".to_string()))
            }
        }
    }

    #[async_trait]
    impl ObjectBackend for FakeBackend {
        async fn test_connection(&self) -> Result<Value, RpcError> {
            self.check()?;
            Ok(json!({"version": "test"}))
        }

        async fn search_objects(
            &self,
            _filters: Vec<SearchFilter>,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<ObjectRecord>, RpcError> {
            self.check()?;
            Ok(self.records.iter().skip(offset).take(limit).cloned().collect())
        }

        async fn create_object(
            &self,
            _type_key: &str,
            details: Details,
            _template_id: &str,
        ) -> Result<ObjectRecord, RpcError> {
            self.check()?;
            Ok(ObjectRecord {
                object_id: "remote-1".to_string(),
                details,
            })
        }

        async fn open_object(&self, object_id: &str) -> Result<ObjectRecord, RpcError> {
            self.check()?;
            self.records
                .iter()
                .find(|record| record.object_id == object_id)
                .cloned()
                .ok_or_else(|| RpcError::Backend {
                    code: 3,
                    message: "object not found".to_string(),
                })
        }

        async fn update_object(&self, _object_id: &str, _details: Details) -> Result<(), RpcError> {
            self.check()
        }

        async fn delete_objects(&self, _object_ids: Vec<String>) -> Result<(), RpcError> {
            self.check()
        }

        async fn list_workspaces(&self) -> Result<Value, RpcError> {
            self.check()?;
            Ok(json!({"workspaceIds": ["ws-1"]}))
        }
    }

    fn record(id: &str, details: Value) -> ObjectRecord {
        ObjectRecord {
            object_id: id.to_string(),
            details: details.as_object().cloned().unwrap_or_default(),
        }
    }

    fn payload(title: &str, content: &str) -> EntryPayload {
        EntryPayload::new(title, content)
    }

    fn raw_payload(body: Value) -> EntryPayload {
        serde_json::from_value(body).unwrap()
    }

    fn gateway(backend: Arc<FakeBackend>) -> (Gateway, Arc<FallbackStore>) {
        let store = FallbackStore::seeded();
        (Gateway::new(backend, store.clone(), true), store)
    }

    fn assert_envelope_shape(entry: &EntryView) {
        let json = serde_json::to_value(entry).unwrap();
        for key in ["id", "title", "content", "createdAt"] {
            assert!(json.get(key).is_some(), "missing {} in {}", key, json);
        }
    }

    // ============================================================
    // PROJECTION
    // ============================================================

    #[test]
    fn test_projection_defaults_for_empty_details() {
        let view = project_record(&record("obj-1", json!({})), 123);

        assert_eq!(view.id, "obj-1");
        assert_eq!(view.title, "Untitled");
        assert_eq!(view.content, "");
        assert_eq!(view.created_at, 123);
        assert!(view.updated_at.is_none());
    }

    #[test]
    fn test_projection_prefers_description_over_content() {
        let view = project_record(
            &record(
                "obj-1",
                json!({"title": "T", "description": "desc", "content": "body"}),
            ),
            0,
        );
        assert_eq!(view.title, "T");
        assert_eq!(view.content, "desc");

        let view = project_record(
            &record("obj-1", json!({"description": "", "content": "body"})),
            0,
        );
        assert_eq!(view.content, "body");
    }

    #[test]
    fn test_projection_empty_or_non_string_title_uses_default() {
        assert_eq!(
            project_record(&record("a", json!({"title": ""})), 0).title,
            "Untitled"
        );
        assert_eq!(
            project_record(&record("a", json!({"title": 7})), 0).title,
            "Untitled"
        );
    }

    #[test]
    fn test_projection_timestamps() {
        let ms = project_record(&record("a", json!({"createdAt": 1_725_451_200_000u64})), 1);
        assert_eq!(ms.created_at, 1_725_451_200_000);

        let secs = project_record(
            &record(
                "a",
                json!({"createdDate": "1725451200", "lastModifiedDate": 1_725_454_800}),
            ),
            1,
        );
        assert_eq!(secs.created_at, 1_725_451_200_000);
        assert_eq!(secs.updated_at, Some(1_725_454_800_000));
    }

    #[test]
    fn test_projection_out_of_range_seconds_use_defaults() {
        let view = project_record(
            &record(
                "a",
                json!({
                    "createdDate": 18_446_744_073_709_552u64,
                    "lastModifiedDate": u64::MAX
                }),
            ),
            42,
        );

        assert_eq!(view.created_at, 42);
        assert!(view.updated_at.is_none());

        let huge_float = project_record(&record("a", json!({"createdDate": 1e300})), 42);
        assert_eq!(huge_float.created_at, 42);
    }

    #[test]
    fn test_entry_details_maps_content_to_description() {
        let details = entry_details("A", "B");
        assert_eq!(details["title"], "A");
        assert_eq!(details["description"], "B");
    }

    // ============================================================
    // LIST
    // ============================================================

    #[tokio::test]
    async fn test_list_from_backend_has_envelope_shape() {
        let backend = FakeBackend::up(vec![
            record("obj-1", json!({"title": "Remote", "description": "R"})),
            record("obj-2", json!({})),
        ]);
        let (gateway, _) = gateway(backend);

        let entries = gateway.list_entries(50, 0).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Remote");
        assert_eq!(entries[1].title, "Untitled");
        entries.iter().for_each(assert_envelope_shape);
    }

    #[tokio::test]
    async fn test_list_falls_back_with_same_shape() {
        let (gateway, _) = gateway(FakeBackend::down());

        let entries = gateway.list_entries(50, 0).await.unwrap();

        assert_eq!(entries.len(), 2);
        entries.iter().for_each(assert_envelope_shape);
    }

    #[tokio::test]
    async fn test_fallback_pagination_returns_second_seed() {
        let (gateway, _) = gateway(FakeBackend::down());
        let params = ListParams {
            limit: Some("1".to_string()),
            offset: Some("1".to_string()),
        };
        let (limit, offset) = params.page();

        let entries = gateway.list_entries(limit, offset).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "2");
        assert_eq!(entries[0].title, "Second Entry");
    }

    #[test]
    fn test_list_params_defaults() {
        assert_eq!(ListParams::default().page(), (50, 0));

        let junk = ListParams {
            limit: Some("abc".to_string()),
            offset: Some("-3".to_string()),
        };
        assert_eq!(junk.page(), (50, 0));

        let zero = ListParams {
            limit: Some("0".to_string()),
            offset: None,
        };
        assert_eq!(zero.page(), (50, 0));
    }

    // ============================================================
    // CREATE
    // ============================================================

    #[tokio::test]
    async fn test_create_rejects_missing_fields_before_any_call() {
        for backend in [FakeBackend::up(Vec::new()), FakeBackend::down()] {
            let (gateway, store) = gateway(backend.clone());

            let cases = [
                EntryPayload::default(),
                raw_payload(json!({"title": "A"})),
                payload("", "B"),
                payload("A", ""),
                raw_payload(json!({"title": null, "content": "B"})),
                raw_payload(json!({"title": false, "content": "B"})),
                raw_payload(json!({"title": 0, "content": "B"})),
            ];
            for case in cases {
                let err = gateway.create_entry(case).await.unwrap_err();
                assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            }

            assert_eq!(backend.calls(), 0);
            assert_eq!(store.len().await, 2);
        }
    }

    #[tokio::test]
    async fn test_create_accepts_truthy_non_string_fields() {
        let (gateway, _) = gateway(FakeBackend::down());

        let entry = gateway
            .create_entry(raw_payload(json!({"title": 123, "content": "x"})))
            .await
            .unwrap();
        assert_eq!(entry.title, "123");
        assert_eq!(entry.content, "x");

        let entry = gateway
            .create_entry(raw_payload(json!({"title": true, "content": ["a"]})))
            .await
            .unwrap();
        assert_eq!(entry.title, "true");
        assert_eq!(entry.content, r#"["a"]"#);
    }

    #[tokio::test]
    async fn test_create_via_backend_leaves_store_alone() {
        let backend = FakeBackend::up(Vec::new());
        let (gateway, store) = gateway(backend.clone());

        let entry = gateway.create_entry(payload("A", "B")).await.unwrap();

        assert_eq!(entry.id, "remote-1");
        assert_eq!(entry.title, "A");
        assert_eq!(entry.content, "B");
        assert_eq!(backend.calls(), 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_falls_back_and_is_listed() {
        let (gateway, store) = gateway(FakeBackend::down());

        let entry = gateway.create_entry(payload("A", "B")).await.unwrap();

        assert_eq!(store.len().await, 3);
        let listed = gateway.list_entries(50, 0).await.unwrap();
        assert!(listed.contains(&entry));
    }

    // ============================================================
    // GET / UPDATE / DELETE
    // ============================================================

    #[tokio::test]
    async fn test_get_from_backend_and_fallback() {
        let backend = FakeBackend::up(vec![record("obj-9", json!({"title": "Nine"}))]);
        let (up, _) = gateway(backend);
        assert_eq!(up.get_entry("obj-9").await.unwrap().title, "Nine");

        let (down, _) = gateway(FakeBackend::down());
        assert_eq!(down.get_entry("1").await.unwrap().title, "First Entry");
        let err = down.get_entry("nope").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_via_backend_projects_requested_details() {
        let (gateway, store) = gateway(FakeBackend::up(Vec::new()));

        let entry = gateway
            .update_entry("obj-1", payload("New", "Body"))
            .await
            .unwrap();

        assert_eq!(entry.id, "obj-1");
        assert_eq!(entry.title, "New");
        assert_eq!(entry.content, "Body");
        assert_eq!(entry.updated_at, Some(entry.created_at));
        assert_eq!(store.get("1").await.unwrap().title, "First Entry");
    }

    #[tokio::test]
    async fn test_update_falls_back_to_store() {
        let (gateway, store) = gateway(FakeBackend::down());

        let entry = gateway.update_entry("2", payload("X", "Y")).await.unwrap();

        assert_eq!(entry.title, "X");
        assert!(entry.updated_at.is_some());
        assert_eq!(store.get("2").await.unwrap().content, "Y");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_and_store_unchanged() {
        let (gateway, store) = gateway(FakeBackend::down());
        let before = store.list(50, 0).await;

        let err = gateway
            .update_entry("missing", payload("X", "Y"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.list(50, 0).await, before);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_fields_before_any_call() {
        let backend = FakeBackend::down();
        let (gateway, _) = gateway(backend.clone());

        let err = gateway.update_entry("1", payload("", "Y")).await.unwrap_err();

        assert!(matches!(err, GatewayError::InvalidInput(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_falls_back_and_returns_removed_entry() {
        let (gateway, store) = gateway(FakeBackend::down());

        let response = gateway.delete_entry("1").await.unwrap();

        assert_eq!(response.id, "1");
        let removed = response.deleted_entry.expect("fallback delete returns the entry");
        assert_eq!(removed.title, "First Entry");
        assert_eq!(store.len().await, 1);
        let listed = gateway.list_entries(50, 0).await.unwrap();
        assert!(listed.iter().all(|entry| entry.id != "1"));
    }

    #[tokio::test]
    async fn test_delete_via_backend() {
        let backend = FakeBackend::up(Vec::new());
        let (gateway, store) = gateway(backend.clone());

        let response = gateway.delete_entry("obj-1").await.unwrap();

        assert!(response.deleted_entry.is_none());
        assert_eq!(backend.calls(), 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let (gateway, store) = gateway(FakeBackend::down());

        let err = gateway.delete_entry("missing").await.unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.len().await, 2);
    }

    // ============================================================
    // DIAGNOSTICS & PASSTHROUGH
    // ============================================================

    #[tokio::test]
    async fn test_connection_failure_is_repeatable() {
        let backend = FakeBackend::down();
        let (gateway, _) = gateway(backend.clone());

        let first = gateway.test_connection().await.unwrap_err();
        let second = gateway.test_connection().await.unwrap_err();

        assert_eq!(first, second);
        assert_eq!(backend.calls(), 2, "every probe must hit the backend");
    }

    #[tokio::test]
    async fn test_backend_only_routes_surface_errors() {
        let (gateway, _) = gateway(FakeBackend::down());

        assert_eq!(
            gateway.workspaces().await.unwrap_err().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            gateway.app_version().await.unwrap_err().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let (up, _) = gateway_up();
        assert_eq!(up.workspaces().await.unwrap()["workspaceIds"][0], "ws-1");
    }

    fn gateway_up() -> (Gateway, Arc<FallbackStore>) {
        gateway(FakeBackend::up(Vec::new()))
    }

    #[tokio::test]
    async fn test_disabled_fallback_surfaces_backend_errors() {
        let store = FallbackStore::seeded();
        let gateway = Gateway::new(FakeBackend::down(), store.clone(), false);

        let err = gateway.create_entry(payload("A", "B")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Backend(RpcError::Unreachable(_))));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert!(gateway.list_entries(50, 0).await.is_err());
        assert!(gateway.delete_entry("1").await.is_err());
        assert_eq!(store.len().await, 2);
    }

    // ============================================================
    // PANICS
    // ============================================================

    /// Backend whose search panics, standing in for any handler bug.
    struct PanickingBackend;

    #[async_trait]
    impl ObjectBackend for PanickingBackend {
        async fn test_connection(&self) -> Result<Value, RpcError> {
            Ok(json!({}))
        }

        async fn search_objects(
            &self,
            _filters: Vec<SearchFilter>,
            _limit: usize,
            _offset: usize,
        ) -> Result<Vec<ObjectRecord>, RpcError> {
            panic!("search exploded");
        }

        async fn create_object(
            &self,
            _type_key: &str,
            _details: Details,
            _template_id: &str,
        ) -> Result<ObjectRecord, RpcError> {
            Err(RpcError::Unreachable("down".to_string()))
        }

        async fn open_object(&self, _object_id: &str) -> Result<ObjectRecord, RpcError> {
            Err(RpcError::Unreachable("down".to_string()))
        }

        async fn update_object(&self, _object_id: &str, _details: Details) -> Result<(), RpcError> {
            Err(RpcError::Unreachable("down".to_string()))
        }

        async fn delete_objects(&self, _object_ids: Vec<String>) -> Result<(), RpcError> {
            Err(RpcError::Unreachable("down".to_string()))
        }

        async fn list_workspaces(&self) -> Result<Value, RpcError> {
            Ok(json!({}))
        }
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_internal_error_response() {
        let gateway = Arc::new(Gateway::new(
            Arc::new(PanickingBackend),
            FallbackStore::seeded(),
            true,
        ));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(gateway)).await.unwrap();
        });

        let resp = reqwest::get(format!("http://{}/objects", addr)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"error": "Internal server error"}));

        // The server keeps answering after the panic.
        let resp = reqwest::get(format!("http://{}/objects/1", addr)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
