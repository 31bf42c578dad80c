use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    database,
    error::Result,
    models::{NewProduct, Product, ProductChanges},
    queries::product_queries,
};

/// Persistence seam for product records. Ids are opaque strings; an id the
/// backend cannot interpret is reported as an error, not as a missing record.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product>;
    async fn find_all(&self) -> Result<Vec<Product>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>>;
    async fn update(&self, id: &str, changes: &ProductChanges) -> Result<Option<Product>>;
    /// Returns whether a record was deleted.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        product_queries::create_product(&self.pool, &product).await
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        product_queries::find_all(&self.pool).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        product_queries::find_by_id(&self.pool, id).await
    }

    async fn update(&self, id: &str, changes: &ProductChanges) -> Result<Option<Product>> {
        product_queries::update_product(&self.pool, id, changes).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let deleted = product_queries::delete_product(&self.pool, id).await?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> Result<()> {
        database::check_health(&self.pool).await
    }
}
