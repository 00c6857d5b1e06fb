use axum::Router;

/// A business module registered into the server.
///
/// Each module declares the record types it contributes to the model
/// registry and the HTTP routes serving them. The binary entry point
/// collects all modules and merges their routes into a single Router.
pub trait Module: Send + Sync {
    /// Module name, used for logging and route prefixes.
    fn name(&self) -> &str;

    /// Dotted names of the record types this module registers,
    /// e.g. `product.product`.
    fn models(&self) -> &[&'static str];

    /// Return the module's routes, to be nested under `/{name}`.
    fn routes(&self) -> Router;
}
