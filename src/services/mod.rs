pub mod image_upload;

pub use image_upload::{ImageUploader, S3ImageUploader};
