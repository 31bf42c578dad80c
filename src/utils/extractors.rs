use std::path::Path;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, multipart::Field},
};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Multipart file fields accepted on product creation, in upload order.
pub const IMAGE_SLOTS: [&str; 4] = ["image1", "image2", "image3", "image4"];

/// JSON body extractor whose rejections render as the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// A file received in one of the image slots, spooled to a temporary file.
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct UploadedImage {
    pub content_type: String,
    file: NamedTempFile,
}

impl UploadedImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn spool(slot: &'static str, mut field: Field<'_>) -> Result<Self> {
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .map(str::to_owned)
            .or_else(|| {
                file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let file = NamedTempFile::new()?;
        let mut writer = tokio::fs::File::from_std(file.reopen()?);
        let mut size = 0usize;

        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        tracing::debug!(
            slot,
            file_name = file_name.as_deref().unwrap_or_default(),
            content_type = %content_type,
            size,
            "Buffered uploaded image"
        );

        Ok(Self { content_type, file })
    }
}

/// Body of a product creation request: text fields plus up to four files.
///
/// Multipart bodies keep their text fields as strings (repeated names become
/// arrays) and spool files per slot; any other body is read as a JSON object.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: Map<String, Value>,
    pub uploads: Vec<UploadedImage>,
}

impl ProductForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut fields = Map::new();
        let mut slots: [Option<UploadedImage>; 4] = Default::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if field.file_name().is_none() {
                let value = field.text().await?;
                append_field(&mut fields, &name, value);
                continue;
            }

            let index = IMAGE_SLOTS
                .iter()
                .position(|slot| *slot == name)
                .ok_or_else(unexpected_field)?;

            if slots[index].is_some() {
                return Err(unexpected_field());
            }

            slots[index] = Some(UploadedImage::spool(IMAGE_SLOTS[index], field).await?);
        }

        Ok(Self {
            fields,
            uploads: slots.into_iter().flatten().collect(),
        })
    }
}

impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let is_multipart = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            return Self::from_multipart(multipart).await;
        }

        let Json(fields) = Json::<Map<String, Value>>::from_request(req, state).await?;

        Ok(Self {
            fields,
            uploads: Vec::new(),
        })
    }
}

fn append_field(fields: &mut Map<String, Value>, name: &str, value: String) {
    let (key, force_array) = match name.strip_suffix("[]") {
        Some(key) => (key, true),
        None => (name, false),
    };

    match fields.get_mut(key) {
        Some(Value::Array(items)) => items.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
        None if force_array => {
            fields.insert(key.to_string(), Value::Array(vec![Value::String(value)]));
        }
        None => {
            fields.insert(key.to_string(), Value::String(value));
        }
    }
}

fn unexpected_field() -> AppError {
    AppError::BadRequest("Unexpected field".to_string())
}
