//! Serves stored product images.

use crate::{errors::AppResult, state::AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// GET `/images/{file_name}` — stream an image back to the client.
pub async fn get_image(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> AppResult<Response> {
    let file = state.images.open(&file_name).await?;
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&file_name)),
    );
    if let Some(length) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok(response)
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn guesses_content_type_from_extension() {
        assert_eq!(content_type_for("abc_photo.PNG"), "image/png");
        assert_eq!(content_type_for("abc_photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("abc_notes"), "application/octet-stream");
    }
}
