#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use product_catalog::{
    db, repositories::product_repository::ProductRepository, routes::routes::app,
    services::file_store::FileStore, state::AppState,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "catalog-test-boundary";
const TEST_UPLOAD_LIMIT: usize = 1024 * 1024;

/// A fresh database file and image directory per test.
pub struct TestApp {
    _dir: TempDir,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let pool = db::connect_file(&dir.path().join("catalog.db"))
            .await
            .expect("open database");
        db::run_migrations(&pool).await.expect("migrate");

        let images = FileStore::new(dir.path().join("wwwroot").join("images"));
        images.ensure_root().await.expect("image dir");

        Self {
            _dir: dir,
            state: AppState::new(ProductRepository::new(pool), images),
        }
    }

    /// The router as production builds it, over this app's state.
    pub fn router(&self) -> Router {
        app(self.state.clone(), TEST_UPLOAD_LIMIT)
    }

    pub fn images_dir(&self) -> &Path {
        &self.state.images.root
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.images_dir().join(name)
    }

    /// Run raw SQL against the app's database, e.g. to install a trigger.
    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql)
            .execute(&self.state.products.db)
            .await
            .expect("execute sql");
    }

    /// Number of entries currently in the image directory.
    pub fn image_count(&self) -> usize {
        std::fs::read_dir(self.images_dir())
            .expect("read image dir")
            .count()
    }

    pub async fn get(&self, uri: &str) -> Response {
        send(self.router(), Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_empty(&self, uri: &str) -> Response {
        send(
            self.router(),
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST a multipart form; `file` is `(filename, bytes)` for the image field.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        send(self.router(), request).await
    }

    /// Create a product through the form and return its id.
    pub async fn create_product(
        &self,
        name: &str,
        price: &str,
        quantity: &str,
        file: Option<(&str, &[u8])>,
    ) -> i64 {
        let response = self
            .post_form(
                "/Product/Create",
                &[("name", name), ("price", price), ("quantity", quantity)],
                file,
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        id_from_location(&location(&response))
    }
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn id_from_location(location: &str) -> i64 {
    location
        .rsplit('/')
        .next()
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("no id in {}", location))
}
