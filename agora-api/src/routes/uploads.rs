use crate::extract::SignedIn;
use agora_app::domain::{Bucket, ImageUpload, MAX_FILE_SIZE};
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

const IMAGE_FIELD: &str = "image";

pub fn routes() -> Router<AppContext> {
    // Oversized files must still reach validation to get a field error.
    Router::new()
        .route("/api/uploads/{bucket}", post(upload))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE * 2))
}

#[derive(Serialize)]
struct Uploaded {
    url: String,
}

/// Registration uploads a picture before the account exists, so a signed-in
/// identity is enough here.
async fn upload(
    State(ctx): State<AppContext>,
    _signed_in: SignedIn,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Uploaded>, AppError> {
    let bucket: Bucket = bucket
        .parse()
        .map_err(|_| AppError::NotFound("Espace de stockage".to_string()))?;

    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::validation(IMAGE_FIELD, e.body_text())
    };
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(invalid)?.to_vec();

        let url = ctx
            .uploads
            .upload(
                bucket,
                ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                },
            )
            .await?;
        return Ok(Json(Uploaded { url }));
    }
    Err(AppError::validation(IMAGE_FIELD, "Aucune image fournie"))
}
