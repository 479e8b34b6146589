//! Form models exchanged with the create and edit screens.
//!
//! A submitted form arrives as loosely typed [`FormData`]. Binding turns it
//! into a typed view model and collects every problem found along the way,
//! both parse failures and rule violations, keyed by field name. Binding never
//! fails outright: a bad field yields an error entry and a default value so
//! the form can be re-rendered with what the user typed.

use super::product::Product;
use bytes::Bytes;
use rust_decimal::Decimal;
use serde::Serialize;
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    str::FromStr,
};
use validator::{Validate, ValidationError};

/// Error messages per form field, ordered for stable output.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// An uploaded file held in memory until the form has been validated.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Raw submitted form: text fields by name plus the optional image part.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub image: Option<UploadedFile>,
}

impl FormData {
    /// Trimmed value of a text field, empty when the field was not sent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }
}

/// A form ready to be rendered: the model plus any field errors.
#[derive(Serialize, Debug)]
pub struct FormView<T> {
    pub model: T,
    pub errors: FieldErrors,
}

impl<T> FormView<T> {
    pub fn new(model: T) -> Self {
        Self {
            model,
            errors: FieldErrors::new(),
        }
    }

    pub fn with_errors(model: T, errors: FieldErrors) -> Self {
        Self { model, errors }
    }
}

/// Payload of the "new product" form.
#[derive(Serialize, Validate, Clone, Debug, Default)]
pub struct CreateViewModel {
    #[validate(length(min = 1, max = 100, message = "Name is required (at most 100 characters)"))]
    pub name: String,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,

    #[serde(skip)]
    pub image: Option<UploadedFile>,
}

impl CreateViewModel {
    /// Bind a submitted form, returning the model and every error found.
    pub fn bind(form: FormData) -> (Self, FieldErrors) {
        let mut errors = FieldErrors::new();
        let name = form.text("name").to_string();
        let price = parse_field::<Decimal>(&form, "price", "Price", &mut errors);
        let quantity = parse_field::<i32>(&form, "quantity", "Quantity", &mut errors);

        let model = Self {
            name,
            price: price.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            image: form.image,
        };
        collect_rule_errors(&model, &mut errors);
        (model, errors)
    }

    /// Turn the validated form into an unsaved product.
    pub fn into_product(self, image: Option<String>) -> Product {
        Product::new(self.name, self.price, self.quantity, image)
    }
}

/// Payload of the "edit product" form.
///
/// `existing_image` travels with the form so the screen can show the current
/// picture and so a re-rendered form keeps it.
#[derive(Serialize, Validate, Clone, Debug, Default)]
pub struct EditViewModel {
    #[validate(range(min = 1, message = "Unknown product"))]
    pub id: i64,

    #[validate(length(min = 1, max = 100, message = "Name is required (at most 100 characters)"))]
    pub name: String,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,

    pub existing_image: Option<String>,

    #[serde(skip)]
    pub image: Option<UploadedFile>,
}

impl EditViewModel {
    pub fn bind(form: FormData) -> (Self, FieldErrors) {
        let mut errors = FieldErrors::new();
        let id = parse_field::<i64>(&form, "id", "Id", &mut errors);
        let name = form.text("name").to_string();
        let price = parse_field::<Decimal>(&form, "price", "Price", &mut errors);
        let quantity = parse_field::<i32>(&form, "quantity", "Quantity", &mut errors);
        let existing_image = Some(form.text("existing_image"))
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let model = Self {
            id: id.unwrap_or_default(),
            name,
            price: price.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            existing_image,
            image: form.image,
        };
        // A failed id parse already explains itself.
        if id.is_some() {
            collect_rule_errors(&model, &mut errors);
        } else {
            let mut rule_errors = FieldErrors::new();
            collect_rule_errors(&model, &mut rule_errors);
            rule_errors.remove("id");
            merge(&mut errors, rule_errors);
        }
        (model, errors)
    }

    /// Overwrite the editable fields of `product`. The image is handled
    /// separately since it only changes when a new file was uploaded.
    pub fn apply_to(&self, product: &mut Product) {
        product.name = self.name.clone();
        product.price = self.price;
        product.quantity = self.quantity;
    }
}

impl From<Product> for EditViewModel {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            quantity: product.quantity,
            existing_image: product.image,
            image: None,
        }
    }
}

/// Delete confirmation screen. `error` is set when a delete attempt failed
/// and the screen is shown again.
#[derive(Serialize, Debug)]
pub struct DeleteView {
    pub product: Option<Product>,
    pub error: Option<String>,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        let mut err = ValidationError::new("negative_price");
        err.message = Some(Cow::from("Price cannot be negative"));
        return Err(err);
    }
    Ok(())
}

/// Parse a required text field, recording a message under `field` on failure.
fn parse_field<T: FromStr>(
    form: &FormData,
    field: &str,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<T> {
    let raw = form.text(field);
    if raw.is_empty() {
        push_error(errors, field, format!("{} is required", label));
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            push_error(errors, field, format!("{} must be a valid number", label));
            None
        }
    }
}

fn collect_rule_errors(model: &impl Validate, errors: &mut FieldErrors) {
    let Err(validation) = model.validate() else {
        return;
    };
    for (field, field_errors) in validation.field_errors() {
        for err in field_errors {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            push_error(errors, &field, message);
        }
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

fn merge(into: &mut FieldErrors, from: FieldErrors) {
    for (field, messages) in from {
        into.entry(field).or_default().extend(messages);
    }
}
