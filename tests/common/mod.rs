#![allow(dead_code)]

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use product_back::{
    AppError, AppState, Result,
    app,
    config::{CorsConfig, ServerConfig},
    database::ProductStore,
    models::{NewProduct, Product, ProductChanges},
    services::ImageUploader,
};
use serde_json::Value;
use tokio::sync::Barrier;
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    products: Mutex<Vec<Product>>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    pub fn insert(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(
                "connection refused".to_string(),
            )));
        }
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| {
        AppError::DatabaseError(sqlx::Error::Protocol(format!(
            "invalid input syntax for type uuid: {e}"
        )))
    })
}

/// In-memory stand-in for the `COALESCE` update in `product_queries`; the SQL
/// itself is only exercised against a live Postgres.
pub fn apply_changes(changes: &ProductChanges, product: &mut Product) {
    if let Some(name) = &changes.name {
        product.name = name.clone();
    }
    if let Some(price) = changes.price {
        product.price = price;
    }
    if let Some(category) = &changes.category {
        product.category = category.clone();
    }
    if let Some(sub_category) = &changes.sub_category {
        product.sub_category = Some(sub_category.clone());
    }
    if let Some(bestseller) = changes.bestseller {
        product.bestseller = bestseller;
    }
    if let Some(sizes) = &changes.sizes {
        product.sizes = sizes.clone();
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        self.check()?;
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            sub_category: product.sub_category,
            sizes: product.sizes,
            bestseller: product.bestseller,
            image: product.image,
            date: product.date,
        };
        self.insert(product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        self.check()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        self.check()?;
        let id = parse_id(id)?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update(&self, id: &str, changes: &ProductChanges) -> Result<Option<Product>> {
        self.check()?;
        let id = parse_id(id)?;
        let mut products = self.products.lock().unwrap();
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            apply_changes(changes, product);
            product.clone()
        }))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        self.check()?;
        let id = parse_id(id)?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

/// Returns `https://cdn.test/<file contents>`. The upload whose contents are
/// "first" is delayed so it finishes after the others. With `rendezvous` set,
/// every upload waits until that many uploads are in flight at once.
#[derive(Default)]
pub struct FakeUploader {
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
    pub rendezvous: Option<Arc<Barrier>>,
}

impl FakeUploader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn meeting(uploads: usize) -> Self {
        Self {
            rendezvous: Some(Arc::new(Barrier::new(uploads))),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageUploader for FakeUploader {
    async fn upload(&self, path: &Path, content_type: &str) -> Result<String> {
        if self.fail {
            return Err(AppError::UploadError("bucket unavailable".to_string()));
        }

        if let Some(barrier) = &self.rendezvous {
            tokio::time::timeout(Duration::from_secs(2), barrier.wait())
                .await
                .map_err(|_| AppError::UploadError("uploads did not overlap".to_string()))?;
        }

        let contents = tokio::fs::read_to_string(path).await?;
        if contents == "first" {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        self.calls
            .lock()
            .unwrap()
            .push(format!("{contents}:{content_type}"));

        Ok(format!("https://cdn.test/{contents}"))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub uploader: Arc<FakeUploader>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(MemoryStore::default(), FakeUploader::default())
    }

    pub fn with(store: MemoryStore, uploader: FakeUploader) -> Self {
        let store = Arc::new(store);
        let uploader = Arc::new(uploader);
        let state = AppState::new(store.clone(), uploader.clone());
        let router = app::router(state, &ServerConfig::default(), &CorsConfig::default())
            .expect("router builds");

        Self {
            router,
            store,
            uploader,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

const BOUNDARY: &str = "product-test-boundary";

/// Builds a multipart request; `files` are `(slot, file name, contents)`.
pub fn multipart_request(fields: &[(&str, &str)], files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = String::new();

    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }

    for (slot, file_name, contents) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{slot}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n{contents}\r\n"
        ));
    }

    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/product/add")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
