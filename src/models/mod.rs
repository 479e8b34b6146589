//! Data models for the product catalog.
//!
//! `product` is the persisted entity; `view_models` holds the transient form
//! payloads used by the create and edit screens.

pub mod product;
pub mod view_models;
