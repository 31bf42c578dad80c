use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::primitives::ByteStream;
use futures::future::try_join_all;
use uuid::Uuid;

use crate::{
    config::S3Config,
    error::{AppError, Result},
    models::ImageSource,
    utils::UploadedImage,
};

/// Image hosting seam: takes a local file and returns a durable public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, path: &Path, content_type: &str) -> Result<String>;
}

pub struct S3ImageUploader {
    client: s3::Client,
    bucket: String,
    prefix: String,
    assets_url: String,
}

impl S3ImageUploader {
    pub fn new(client: s3::Client, config: &S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            prefix: config.prefix.trim_matches('/').to_string(),
            assets_url: config.assets_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_key(&self, content_type: &str) -> String {
        format!(
            "{}/{}.{}",
            self.prefix,
            Uuid::new_v4(),
            extension_for(content_type)
        )
    }
}

#[async_trait]
impl ImageUploader for S3ImageUploader {
    async fn upload(&self, path: &Path, content_type: &str) -> Result<String> {
        let key = self.object_key(content_type);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| AppError::UploadError(format!("Failed to read upload: {}", e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::UploadError(s3::Error::from(e).to_string()))?;

        tracing::info!(key = %key, "Product image uploaded to S3");

        Ok(format!("{}/{}", self.assets_url, key))
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/avif" => "avif",
        _ => "jpg",
    }
}

/// Uploads every image concurrently. URLs come back in slot order no matter
/// which upload finishes first.
pub async fn upload_all(
    uploader: &dyn ImageUploader,
    images: &[UploadedImage],
) -> Result<Vec<String>> {
    try_join_all(
        images
            .iter()
            .map(|image| uploader.upload(image.path(), &image.content_type)),
    )
    .await
}

pub async fn resolve_image_urls(
    uploader: &dyn ImageUploader,
    source: ImageSource,
) -> Result<Vec<String>> {
    match source {
        ImageSource::Uploads(images) => upload_all(uploader, &images).await,
        ImageSource::Urls(urls) => Ok(urls),
        ImageSource::Empty => Ok(Vec::new()),
    }
}
