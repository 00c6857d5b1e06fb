mod product;
mod product_code;

pub use product::*;
pub use product_code::*;

/// Registry name of the product record type.
pub const PRODUCT_MODEL: &str = "product.product";

/// Registry name of the product code record type.
pub const PRODUCT_CODE_MODEL: &str = "product.product.code";
