use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub_category: Option<String>,
    pub sizes: Vec<String>,
    pub bestseller: bool,
    pub image: Vec<String>,
    /// Creation time in epoch milliseconds.
    pub date: i64,
}

/// A fully resolved product ready to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub sub_category: Option<String>,
    pub sizes: Vec<String>,
    pub bestseller: bool,
    pub image: Vec<String>,
    pub date: i64,
}

/// Partial update. `Some` marks a field that was present in the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub bestseller: Option<bool>,
    pub sizes: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Product {
        Product {
            id: Uuid::nil(),
            name: "Linen Shirt".to_string(),
            description: "Breathable summer shirt".to_string(),
            price: Decimal::new(4999, 2),
            category: "Men".to_string(),
            sub_category: Some("Topwear".to_string()),
            sizes: vec!["M".to_string(), "L".to_string()],
            bestseller: true,
            image: vec!["https://cdn.example/a.jpg".to_string()],
            date: 1_700_000_000_000,
        }
    }

    #[test]
    fn serializes_with_camel_case_and_numeric_price() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["subCategory"], "Topwear");
        assert_eq!(value["price"], json!(49.99));
        assert_eq!(value["sizes"], json!(["M", "L"]));
        assert_eq!(value["date"], json!(1_700_000_000_000i64));
    }

    #[test]
    fn missing_sub_category_is_omitted() {
        let mut product = sample();
        product.sub_category = None;

        let value = serde_json::to_value(product).unwrap();
        assert!(value.get("subCategory").is_none());
    }
}
