use serde::{Deserialize, Serialize};

use super::product_code::{CodeLine, ProductCode, default_active};

/// Product (`product.product`): a catalog entry.
///
/// `codes` is the one-to-many side of [`ProductCode::product`]. It is
/// populated on read from the code table and never stored with the product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Internal reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Identification codes, in creation order.
    #[serde(default)]
    pub codes: Vec<ProductCode>,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a product, optionally with its first codes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub codes: Vec<CodeLine>,
}

impl CreateProduct {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
            description: None,
            active: true,
            codes: Vec::new(),
        }
    }
}

/// Field overrides applied to product duplicates.
///
/// Unset fields keep the source's value. Codes are never carried over from
/// the source; `codes` lists new lines to create on each duplicate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyDefaults {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub codes: Vec<CodeLine>,
}
