use crate::{repositories::product_repository::ProductRepository, services::file_store::FileStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductRepository,
    pub images: FileStore,
}

impl AppState {
    pub fn new(products: ProductRepository, images: FileStore) -> Self {
        Self { products, images }
    }
}
