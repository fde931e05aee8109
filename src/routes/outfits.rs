use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{
        DeleteOutfitQuery, GetOutfitsResponse, Outfit, ResultResponse, SuggestOutfitRequest,
        SuggestOutfitResponse, UpdateOutfitRequest, UploadOutfitResponse,
    },
    services::{imaging::decode_upload, tagging::tag_image},
};

const FILE_FIELD: &str = "file";

/// POST /outfit/upload-outfit (multipart, `file` field)
pub async fn upload_outfit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadOutfitResponse>)> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::InvalidInput("File must be an image".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
        upload = Some((content_type, bytes));
        break;
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }

    let tagger = state.tagger.clone();
    let taxonomy = state.taxonomy.clone();
    let image_bytes = bytes.clone();
    let tags = tokio::task::spawn_blocking(move || {
        let image = decode_upload(&image_bytes)?;
        tag_image(tagger.as_ref(), &taxonomy, &image)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let blob = state.blobs.put(bytes.to_vec(), &content_type).await?;

    let outfit = Outfit::new(user.user_id(), blob.url, tags).with_image_id(blob.id);
    state.outfits.insert(&outfit).await?;

    tracing::info!(
        outfit_id = %outfit.outfit_id,
        wardrobe_id = %outfit.wardrobe_id,
        tags = outfit.tags.len(),
        "Outfit uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadOutfitResponse {
            outfit_id: outfit.outfit_id,
            result: true,
            message: "Outfit uploaded successfully".to_string(),
        }),
    ))
}

/// GET /outfit/get-outfits
pub async fn get_outfits(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<GetOutfitsResponse>> {
    let outfits = state.outfits.list(user.user_id()).await?;
    Ok(Json(GetOutfitsResponse { outfits }))
}

/// PUT /outfit/update-outfit
pub async fn update_outfit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UpdateOutfitRequest>,
) -> AppResult<Json<ResultResponse>> {
    state
        .outfits
        .update_tags(user.user_id(), &request.outfit_id, request.tags)
        .await?;

    Ok(Json(ResultResponse::ok("Outfit updated successfully")))
}

/// DELETE /outfit/delete-outfit?outfit_id=
pub async fn delete_outfit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<DeleteOutfitQuery>,
) -> AppResult<Json<ResultResponse>> {
    let outfit = state.outfits.delete(user.user_id(), &query.outfit_id).await?;

    if let Some(image_id) = &outfit.image_id {
        if let Err(e) = state.blobs.delete(image_id).await {
            tracing::warn!(
                error = %e,
                outfit_id = %outfit.outfit_id,
                image_id = %image_id,
                "Outfit deleted but its image could not be removed"
            );
        }
    }

    Ok(Json(ResultResponse::ok("Outfit deleted successfully")))
}

/// POST /outfit/suggest-outfit
pub async fn suggest_outfit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    request: Option<Json<SuggestOutfitRequest>>,
) -> AppResult<Json<SuggestOutfitResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    tracing::debug!(temperature = ?request.temperature, query = ?request.query, "Outfit suggestion requested");

    let wardrobe = state.outfits.list(user.user_id()).await?;
    let (outfits, composite_image_url) = state.planner.suggest(&wardrobe).await?;

    Ok(Json(SuggestOutfitResponse {
        outfits,
        composite_image_url,
        result: true,
        message: "Outfit suggestion generated".to_string(),
    }))
}
