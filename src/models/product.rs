//! Represents a product record in the catalog.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, Row, sqlite::SqliteRow};

/// A single catalog entry.
///
/// `image` holds the generated filename of the uploaded picture inside the
/// images directory, or `None` when no picture was ever uploaded.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Product {
    /// Identity assigned by the database on insert.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: Decimal,

    /// Units in stock.
    pub quantity: i32,

    /// Stored image filename, if any.
    pub image: Option<String>,
}

impl Product {
    /// Build a product that has not been persisted yet. The `id` is a
    /// placeholder until the repository assigns one.
    pub fn new(name: impl Into<String>, price: Decimal, quantity: i32, image: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            price,
            quantity,
            image,
        }
    }
}

// Prices are kept as TEXT in SQLite, which has no decimal column type.
impl<'r> FromRow<'r, SqliteRow> for Product {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let raw_price: String = row.try_get("price")?;
        let price = raw_price
            .parse::<Decimal>()
            .map_err(|err| sqlx::Error::ColumnDecode {
                index: "price".into(),
                source: Box::new(err),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price,
            quantity: row.try_get("quantity")?,
            image: row.try_get("image")?,
        })
    }
}
