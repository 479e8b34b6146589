//! HTTP handlers for the product screens.
//!
//! Screens are rendered as JSON documents. Successful form submissions answer
//! with a `303 See Other` redirect; invalid ones re-render the form with a
//! `422` and the collected field errors.

use crate::{
    errors::{AppError, AppResult},
    models::{
        product::Product,
        view_models::{CreateViewModel, DeleteView, EditViewModel, FormData, FormView, UploadedFile},
    },
    repositories::Repository,
    services::file_store::FileStore,
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info, warn};

/// Multipart field carrying the image file.
const IMAGE_FIELD: &str = "image";

const INDEX_PATH: &str = "/Product";

/// GET `/Product` — list every product.
pub async fn index(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.products.get_all().await?;
    Ok(Json(products))
}

/// GET `/Product/Details/{id}`
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = state
        .products
        .get(id)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))?;
    Ok(Json(product))
}

/// GET `/Product/Create` — empty form.
pub async fn create_form() -> Json<FormView<CreateViewModel>> {
    Json(FormView::new(CreateViewModel::default()))
}

/// POST `/Product/Create`
///
/// Stores the uploaded image (if any) before inserting the product. When the
/// insert fails the freshly stored image is removed again.
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (model, errors) = CreateViewModel::bind(read_form(multipart).await?);
    if !errors.is_empty() {
        debug!("create form rejected: {:?}", errors);
        return Ok(render_invalid(FormView::with_errors(model, errors)));
    }

    let image = match &model.image {
        Some(upload) => Some(state.images.store(upload).await?),
        None => None,
    };

    let created = match state.products.add(model.into_product(image.clone())).await {
        Ok(created) => created,
        Err(err) => {
            if let Some(name) = &image {
                remove_image(&state.images, name).await;
            }
            return Err(err.into());
        }
    };

    info!(
        "created product {} `{}` (image: {:?})",
        created.id, created.name, created.image
    );
    Ok(Redirect::to(&format!("/Product/Details/{}", created.id)).into_response())
}

/// GET `/Product/Edit/{id}` — form pre-filled from the stored product.
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<FormView<EditViewModel>>> {
    let product = state
        .products
        .get(id)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))?;
    Ok(Json(FormView::new(EditViewModel::from(product))))
}

/// POST `/Product/Edit` — the product id comes from the form body.
///
/// Without a new upload the stored image is kept. With one, the new file is
/// stored first and the previously recorded file is removed only once the
/// update went through.
pub async fn edit_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (model, errors) = EditViewModel::bind(read_form(multipart).await?);
    if !errors.is_empty() {
        debug!("edit form for product {} rejected: {:?}", model.id, errors);
        return Ok(render_invalid(FormView::with_errors(model, errors)));
    }

    let mut product = state
        .products
        .get(model.id)
        .await?
        .ok_or_else(|| AppError::product_not_found(model.id))?;
    model.apply_to(&mut product);

    let mut new_image = None;
    let mut replaced_image = None;
    if let Some(upload) = &model.image {
        let stored = state.images.store(upload).await?;
        new_image = Some(stored.clone());
        replaced_image = product.image.replace(stored);
    }

    match state.products.update(product).await {
        Ok(Some(updated)) => {
            if let Some(old) = replaced_image {
                remove_image(&state.images, &old).await;
            }
            info!(
                "updated product {} `{}` (image: {:?})",
                updated.id, updated.name, updated.image
            );
            Ok(Redirect::to(INDEX_PATH).into_response())
        }
        Ok(None) => {
            if let Some(name) = &new_image {
                remove_image(&state.images, name).await;
            }
            Err(AppError::product_not_found(model.id))
        }
        Err(err) => {
            if let Some(name) = &new_image {
                remove_image(&state.images, name).await;
            }
            Err(err.into())
        }
    }
}

/// GET `/Product/Delete/{id}` — confirmation screen.
pub async fn delete_confirm(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteView>> {
    let product = state
        .products
        .get(id)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))?;
    Ok(Json(DeleteView {
        product: Some(product),
        error: None,
    }))
}

/// POST `/Product/Delete/{id}`
///
/// A failed delete is logged and the confirmation screen is shown again with
/// a generic message. The product's image file is left on disk.
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.products.delete(id).await {
        Ok(()) => {
            info!("deleted product {}", id);
            Redirect::to(INDEX_PATH).into_response()
        }
        Err(err) => {
            warn!("failed to delete product {}: {}", id, err);
            let product = match state.products.get(id).await {
                Ok(product) => product,
                Err(err) => {
                    debug!("could not reload product {} for re-render: {}", id, err);
                    None
                }
            };
            Json(DeleteView {
                product,
                error: Some("The product could not be deleted.".into()),
            })
            .into_response()
        }
    }
}

/// Drain a multipart body into text fields plus the optional image.
///
/// An image part with no filename or no bytes is what a browser sends when
/// the file picker was left empty, so it counts as "no upload".
async fn read_form(mut multipart: Multipart) -> AppResult<FormData> {
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            if !file_name.is_empty() && !data.is_empty() {
                form.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn render_invalid<T: serde::Serialize>(view: FormView<T>) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
}

/// Best-effort removal; failures are logged, never returned.
async fn remove_image(images: &FileStore, name: &str) {
    if let Err(err) = images.delete(name).await {
        warn!("could not remove image {}: {}", name, err);
    }
}
