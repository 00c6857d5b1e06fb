pub mod api;
pub mod domain;
pub mod messages;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use openerp_core::Module;
use openerp_sql::SQLStore;

use model::{PRODUCT_CODE_MODEL, PRODUCT_MODEL};
use service::{ProductError, ProductService};

/// Product module: products and their identification codes.
pub struct ProductModule {
    service: Arc<ProductService>,
}

impl ProductModule {
    /// Register the module on a store. Creates and migrates its tables.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ProductError> {
        Ok(Self {
            service: ProductService::new(sql)?,
        })
    }

    pub fn service(&self) -> Arc<ProductService> {
        self.service.clone()
    }
}

impl Module for ProductModule {
    fn name(&self) -> &str {
        "product"
    }

    fn models(&self) -> &[&'static str] {
        &[PRODUCT_MODEL, PRODUCT_CODE_MODEL]
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
