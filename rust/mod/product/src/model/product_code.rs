use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of identification code attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    #[serde(rename = "ean")]
    Ean,
    #[serde(rename = "upc-a")]
    UpcA,
    #[serde(rename = "other")]
    Other,
}

impl CodeType {
    /// Types whose codes have a fixed length and are unique per type.
    pub const CHECKED: [CodeType; 2] = [CodeType::Ean, CodeType::UpcA];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::Ean => "ean",
            CodeType::UpcA => "upc-a",
            CodeType::Other => "other",
        }
    }

    /// Human label, as shown in selection widgets.
    pub fn label(&self) -> &'static str {
        match self {
            CodeType::Ean => "EAN",
            CodeType::UpcA => "UPC-A",
            CodeType::Other => "Other",
        }
    }

    /// Exact length (in characters) a code of this type must have.
    pub fn required_length(&self) -> Option<usize> {
        match self {
            CodeType::Ean => Some(13),
            CodeType::UpcA => Some(12),
            CodeType::Other => None,
        }
    }

    /// Whether codes of this type are checked for length and uniqueness.
    pub fn is_checked(&self) -> bool {
        Self::CHECKED.contains(self)
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ean" => Ok(CodeType::Ean),
            "upc-a" => Ok(CodeType::UpcA),
            "other" => Ok(CodeType::Other),
            _ => Err(format!("unknown code type '{}', expected ean, upc-a or other", s)),
        }
    }
}

pub(crate) fn default_active() -> bool {
    true
}

/// ProductCode (`product.product.code`): an auxiliary identification code
/// owned by one product. `code` is the record's display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductCode {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Code value.
    pub code: String,

    pub code_type: CodeType,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Owning product id. Deleting the product deletes the code.
    pub product: String,

    pub created_at: String,
    pub updated_at: String,
}

/// A code line without its owner, as given when creating or copying a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeLine {
    pub code: String,
    pub code_type: CodeType,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl CodeLine {
    pub fn new(code: impl Into<String>, code_type: CodeType) -> Self {
        Self {
            code: code.into(),
            code_type,
            active: true,
        }
    }

    pub fn for_product(self, product: &str) -> CreateProductCode {
        CreateProductCode {
            code: self.code,
            code_type: self.code_type,
            active: self.active,
            product: product.to_string(),
        }
    }
}

/// Input for creating a product code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductCode {
    pub code: String,
    pub code_type: CodeType,
    #[serde(default = "default_active")]
    pub active: bool,
    pub product: String,
}

impl CreateProductCode {
    pub fn new(product: &str, code: impl Into<String>, code_type: CodeType) -> Self {
        CodeLine::new(code, code_type).for_product(product)
    }
}
