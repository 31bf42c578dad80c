use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{ApiResponse, Product, ProductDraft, ProductUpdateRequest},
    services::image_upload::resolve_image_urls,
    utils::{AppJson, ProductForm},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_product))
        .route("/list", get(list_products))
        .route("/single/{product_id}", get(single_product))
        .route("/update/{id}", put(update_product))
        .route("/remove/{product_id}", delete(remove_product))
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

pub async fn add_product(
    State(state): State<AppState>,
    form: ProductForm,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    let ProductDraft { fields, images } = ProductDraft::parse(form)?;

    // Uploaded objects are not cleaned up if the insert below fails.
    let image = resolve_image_urls(state.uploader.as_ref(), images).await?;
    let date = chrono::Utc::now().timestamp_millis();

    let product = state.store.create(fields.finish(image, date)).await?;

    tracing::info!(id = %product.id, images = product.image.len(), "Product added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Product Added", product)),
    ))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.store.find_all().await?;

    Ok(Json(ApiResponse::data(products)))
}

pub async fn single_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state
        .store
        .find_by_id(&product_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::data(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductUpdateRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    let changes = payload.into_changes()?;

    let product = state
        .store
        .update(&id, &changes)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(id = %product.id, "Product updated");

    Ok(Json(ApiResponse::with_message(
        "Product updated successfully",
        product,
    )))
}

pub async fn remove_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.store.delete_by_id(&product_id).await? {
        return Err(not_found());
    }

    tracing::info!(id = %product_id, "Product removed");

    Ok(Json(ApiResponse::message("Product removed successfully")))
}
