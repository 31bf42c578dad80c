use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, Result},
    models::{NewProduct, ProductChanges},
    utils::{ProductForm, UploadedImage},
};

/// `sizes` arrives either as a JSON-encoded string (multipart forms) or as a
/// native array (JSON bodies). Numeric entries such as shoe sizes are kept as
/// their decimal text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizesInput {
    List(Vec<Value>),
    Encoded(String),
}

impl SizesInput {
    fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|_| invalid_sizes())
    }

    fn is_truthy(&self) -> bool {
        match self {
            SizesInput::List(_) => true,
            SizesInput::Encoded(raw) => !raw.is_empty(),
        }
    }

    pub fn resolve(self) -> Result<Vec<String>> {
        match self {
            SizesInput::List(items) => size_labels(items),
            SizesInput::Encoded(raw) => {
                let items =
                    serde_json::from_str::<Vec<Value>>(&raw).map_err(|_| invalid_sizes())?;
                size_labels(items)
            }
        }
    }
}

fn size_labels(items: Vec<Value>) -> Result<Vec<String>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(size) => Ok(size),
            Value::Number(size) => Ok(size.to_string()),
            _ => Err(invalid_sizes()),
        })
        .collect()
}

/// A text field on update; numbers and booleans are taken as their text form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl TextInput {
    fn is_truthy(&self) -> bool {
        match self {
            TextInput::Text(raw) => !raw.is_empty(),
            TextInput::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            TextInput::Bool(flag) => *flag,
        }
    }

    pub fn resolve(self) -> String {
        match self {
            TextInput::Text(raw) => raw,
            TextInput::Number(n) => n.to_string(),
            TextInput::Bool(flag) => flag.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|_| invalid_price())
    }

    fn is_truthy(&self) -> bool {
        match self {
            PriceInput::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            PriceInput::Text(raw) => !raw.is_empty(),
        }
    }

    pub fn resolve(&self) -> Result<Decimal> {
        let raw = match self {
            PriceInput::Number(n) => n.to_string(),
            PriceInput::Text(raw) => raw.trim().to_string(),
        };

        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| invalid_price())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagInput {
    Bool(bool),
    Text(String),
}

impl FlagInput {
    pub fn resolve(&self) -> bool {
        match self {
            FlagInput::Bool(flag) => *flag,
            FlagInput::Text(raw) => raw == "true",
        }
    }
}

/// Where the product's image URLs come from, decided once per add request.
#[derive(Debug)]
pub enum ImageSource {
    Uploads(Vec<UploadedImage>),
    Urls(Vec<String>),
    Empty,
}

impl ImageSource {
    fn select(uploads: Vec<UploadedImage>, image: Option<&Value>) -> Result<Self> {
        if !uploads.is_empty() {
            return Ok(ImageSource::Uploads(uploads));
        }

        match image {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| text_value(item, "image"))
                .collect::<Result<Vec<_>>>()
                .map(ImageSource::Urls),
            _ => Ok(ImageSource::Empty),
        }
    }
}

/// Field values of a product being created; `image` and `date` are filled in
/// once uploads finish.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub sub_category: Option<String>,
    pub sizes: Vec<String>,
    pub bestseller: bool,
}

impl ProductFields {
    pub fn finish(self, image: Vec<String>, date: i64) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            sub_category: self.sub_category,
            sizes: self.sizes,
            bestseller: self.bestseller,
            image,
            date,
        }
    }
}

#[derive(Debug)]
pub struct ProductDraft {
    pub fields: ProductFields,
    pub images: ImageSource,
}

impl ProductDraft {
    pub fn parse(form: ProductForm) -> Result<Self> {
        let ProductForm { fields: raw, uploads } = form;

        let [name, description, price, category, sizes] =
            ["name", "description", "price", "category", "sizes"]
                .map(|key| raw.get(key).filter(|value| is_truthy(value)));

        let (Some(name), Some(description), Some(price), Some(category), Some(sizes)) =
            (name, description, price, category, sizes)
        else {
            return Err(AppError::BadRequest("Missing required fields".to_string()));
        };

        let sizes = SizesInput::from_value(sizes)?.resolve()?;
        let price = PriceInput::from_value(price)?.resolve()?;

        let fields = ProductFields {
            name: text_value(name, "name")?,
            description: text_value(description, "description")?,
            price,
            category: text_value(category, "category")?,
            sub_category: optional_text(&raw, "subCategory")?,
            sizes,
            bestseller: matches!(raw.get("bestseller"), Some(Value::String(flag)) if flag == "true"),
        };

        let images = ImageSource::select(uploads, raw.get("image"))?;

        Ok(Self { fields, images })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateRequest {
    pub name: Option<TextInput>,
    pub price: Option<PriceInput>,
    pub category: Option<TextInput>,
    pub sub_category: Option<TextInput>,
    /// Outer `Some` when the key is in the body, even as `null`.
    #[serde(default, deserialize_with = "present")]
    pub bestseller: Option<Option<FlagInput>>,
    pub sizes: Option<SizesInput>,
}

impl ProductUpdateRequest {
    /// `bestseller` counts when present at all, `null` included; the other
    /// fields only when they carry a non-empty value.
    pub fn has_changes(&self) -> bool {
        self.name.as_ref().is_some_and(TextInput::is_truthy)
            || self.price.as_ref().is_some_and(PriceInput::is_truthy)
            || self.category.as_ref().is_some_and(TextInput::is_truthy)
            || self.sizes.as_ref().is_some_and(SizesInput::is_truthy)
            || self.sub_category.as_ref().is_some_and(TextInput::is_truthy)
            || self.bestseller.is_some()
    }

    pub fn into_changes(self) -> Result<ProductChanges> {
        if !self.has_changes() {
            return Err(AppError::BadRequest("No update fields provided".to_string()));
        }

        Ok(ProductChanges {
            name: self.name.map(TextInput::resolve),
            price: self.price.as_ref().map(PriceInput::resolve).transpose()?,
            category: self.category.map(TextInput::resolve),
            sub_category: self.sub_category.map(TextInput::resolve),
            // The column is not nullable; an explicit null clears the flag.
            bestseller: self
                .bestseller
                .map(|flag| flag.as_ref().is_some_and(FlagInput::resolve)),
            sizes: self.sizes.map(SizesInput::resolve).transpose()?,
        })
    }
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_value(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(AppError::BadRequest(format!("Invalid {} format", field))),
    }
}

fn optional_text(fields: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => text_value(value, field).map(Some),
    }
}

fn invalid_sizes() -> AppError {
    AppError::BadRequest("Invalid sizes format".to_string())
}

fn invalid_price() -> AppError {
    AppError::BadRequest("Invalid price format".to_string())
}
