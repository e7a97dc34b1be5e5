//! Server test utilities.

use super::fixtures::{BOUNDARY, file_upload};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use coffer_core::config::{AppConfig, MetadataConfig, StorageConfig};
use coffer_metadata::{MetadataStore, SqliteStore};
use coffer_server::{AppState, Claims, create_router, issue_token};
use coffer_storage::{FilesystemBackend, ObjectStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

/// Credentials for one principal.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct Caller {
    pub user: String,
    pub token: Option<String>,
    pub api_key: Option<String>,
}

#[allow(dead_code)]
impl Caller {
    /// Same principal presenting a different secondary key.
    pub fn with_api_key(&self, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..self.clone()
        }
    }

    /// Same principal presenting no secondary key.
    pub fn without_api_key(&self) -> Self {
        Self {
            api_key: None,
            ..self.clone()
        }
    }

    /// Same secondary key presented without a bearer credential.
    pub fn without_token(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    /// Attach this caller's credentials to a request.
    pub fn apply(&self, mut builder: axum::http::request::Builder) -> axum::http::request::Builder {
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }
        builder
    }
}

/// A test server wrapper with all dependencies.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("storage");
        let storage: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(&storage_path)
                .await
                .expect("Failed to create storage backend"),
        );

        let db_path = temp_dir.path().join("metadata.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path, None)
                .await
                .expect("Failed to create metadata store"),
        );

        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem {
            path: storage_path,
        };
        config.metadata = MetadataConfig::Sqlite {
            path: db_path,
            query_timeout_secs: None,
        };
        modifier(&mut config);

        let state = AppState::new(config, storage, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Root of the blob store.
    pub fn storage_root(&self) -> std::path::PathBuf {
        self._temp_dir.path().join("storage")
    }

    /// Sign a bearer credential for `user` valid for five minutes.
    pub fn token(&self, user: &str) -> String {
        self.token_with(Claims::new(user, Duration::from_secs(300)))
    }

    /// Sign arbitrary claims with the server's secret.
    pub fn token_with(&self, claims: Claims) -> String {
        issue_token(&self.state.config.auth, &claims).expect("Failed to sign token")
    }

    /// A caller with a bearer credential but no secondary key yet.
    pub fn anonymous(&self, user: &str) -> Caller {
        Caller {
            user: user.to_string(),
            token: Some(self.token(user)),
            api_key: None,
        }
    }

    /// A caller holding a freshly rotated secondary key.
    pub async fn login(&self, user: &str) -> Caller {
        let caller = self.anonymous(user);
        let (status, body) = self.rotate(&caller).await;
        assert_eq!(status, StatusCode::OK, "rotation failed: {body}");
        let key = body["newApiKey"]
            .as_str()
            .expect("rotation response carries newApiKey")
            .to_string();
        Caller {
            api_key: Some(key),
            ..caller
        }
    }

    /// POST /api/roll-api-key.
    pub async fn rotate(&self, caller: &Caller) -> (StatusCode, Value) {
        let request = caller
            .apply(Request::builder().method("POST").uri("/api/roll-api-key"))
            .body(Body::empty())
            .unwrap();
        self.json(request).await
    }

    /// POST /api/upload with a single `file` field.
    pub async fn upload(
        &self,
        caller: &Caller,
        filename: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        self.upload_raw(caller, file_upload(filename, data)).await
    }

    /// POST /api/upload with a prebuilt multipart body.
    pub async fn upload_raw(&self, caller: &Caller, body: Vec<u8>) -> (StatusCode, Value) {
        let request = caller
            .apply(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload")
                    .header(
                        "Content-Type",
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    ),
            )
            .body(Body::from(body))
            .unwrap();
        self.json(request).await
    }

    /// GET `url` (as returned by upload) and collect the body.
    pub async fn fetch(&self, caller: &Caller, url: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = caller
            .apply(Request::builder().method("GET").uri(url))
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    /// GET /api/list.
    pub async fn list(&self, caller: &Caller) -> (StatusCode, Value) {
        let request = caller
            .apply(Request::builder().method("GET").uri("/api/list"))
            .body(Body::empty())
            .unwrap();
        self.json(request).await
    }

    /// GET an unauthenticated path.
    pub async fn get(&self, uri: &str) -> (StatusCode, Bytes) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    /// Send a request and parse the JSON response body.
    pub async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}
