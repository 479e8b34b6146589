pub mod health_handlers;
pub mod image_handlers;
pub mod product_handlers;
