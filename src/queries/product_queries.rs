use sqlx::PgPool;

use crate::{
    error::Result,
    models::{NewProduct, Product, ProductChanges},
};

// Ids are bound as text and cast in SQL, so a malformed id fails inside the
// database like any other store error.

pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products
            (name, description, price, category, sub_category, sizes, bestseller, image, date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.category)
    .bind(&product.sub_category)
    .bind(&product.sizes)
    .bind(product.bestseller)
    .bind(&product.image)
    .bind(product.date)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY date, id")
        .fetch_all(pool)
        .await?;

    Ok(products)
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1::uuid")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    id: &str,
    changes: &ProductChanges,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
            name = COALESCE($2, name),
            price = COALESCE($3, price),
            category = COALESCE($4, category),
            sub_category = COALESCE($5, sub_category),
            bestseller = COALESCE($6, bestseller),
            sizes = COALESCE($7, sizes)
        WHERE id = $1::uuid
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&changes.name)
    .bind(changes.price)
    .bind(&changes.category)
    .bind(&changes.sub_category)
    .bind(changes.bestseller)
    .bind(&changes.sizes)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn delete_product(pool: &PgPool, id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1::uuid")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
