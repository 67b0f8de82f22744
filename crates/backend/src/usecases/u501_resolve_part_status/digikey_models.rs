use contracts::usecases::u501_resolve_part_status::ProductRecord;
use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";
const STATUS_UNKNOWN: &str = "Status Unknown";

// ============================================================================
// Response structures для DigiKey ProductSearch v4 /productdetails
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductDetailsResponse {
    #[serde(default)]
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(default)]
    pub description: Option<ProductDescription>,
    #[serde(default)]
    pub manufacturer: Option<Manufacturer>,
    #[serde(default)]
    pub manufacturer_product_number: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub datasheet_url: Option<String>,
    #[serde(default)]
    pub quantity_available: Option<f64>,
    #[serde(default)]
    pub product_status: Option<ProductStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductDescription {
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub detailed_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manufacturer {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductStatus {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

impl Product {
    /// Статус жизненного цикла, если он присутствует в ответе
    pub fn status(&self) -> Option<&str> {
        non_empty(self.product_status.as_ref().and_then(|s| s.status.as_ref()))
    }

    /// Плоская запись; отсутствующие поля получают заглушки вместо ошибки
    pub fn to_record(&self) -> ProductRecord {
        let text = |value: Option<&String>| non_empty(value).unwrap_or(NOT_AVAILABLE).to_string();

        ProductRecord {
            status: self.status().unwrap_or(STATUS_UNKNOWN).to_string(),
            description: text(
                self.description
                    .as_ref()
                    .and_then(|d| d.product_description.as_ref()),
            ),
            manufacturer: text(self.manufacturer.as_ref().and_then(|m| m.name.as_ref())),
            product_url: text(self.product_url.as_ref()),
            datasheet_url: text(self.datasheet_url.as_ref()),
            quantity_available: self
                .quantity_available
                .filter(|q| q.is_finite() && *q > 0.0)
                .map(|q| q as u64)
                .unwrap_or(0),
        }
    }
}
