//! HTTP handlers for the bucket gateway.
//! Every call is forwarded to the object-storage service; uploads are
//! buffered in memory before forwarding.

use crate::{
    errors::AppError,
    handlers::reject,
    logging::{RequestContext, log_info},
    models::{
        bucket::BucketDescriptor,
        object::{ObjectDescriptor, ObjectUpload, UploadReceipt},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use serde::Serialize;
use serde_json::json;

/// Multipart field that carries the uploaded file.
pub const FILE_FIELD: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub const NO_FILE: &str = "Nenhum arquivo enviado";
pub const MULTIPLE_FILES: &str = "Envie apenas um arquivo no campo 'file'";
pub const UPLOADED: &str = "Arquivo enviado com sucesso";
pub const DELETED: &str = "Arquivo deletado com sucesso";

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub data: UploadReceipt,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// `GET /buckets`
pub async fn list_buckets(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<BucketDescriptor>>, AppError> {
    let buckets = state.objects.list_buckets().await.map_err(|err| {
        reject(
            &ctx,
            "bucket listing failed",
            AppError::dependency_details("Erro ao listar buckets", &err),
        )
    })?;

    log_info(&ctx, "buckets listed", Some(&json!({ "count": buckets.len() })));
    Ok(Json(buckets))
}

/// `GET /buckets/{bucket_name}`
pub async fn list_objects(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(bucket): Path<String>,
) -> Result<Json<Vec<ObjectDescriptor>>, AppError> {
    let objects = state.objects.list_objects(&bucket).await.map_err(|err| {
        reject(
            &ctx,
            "object listing failed",
            AppError::dependency_details("Erro ao listar objetos do bucket", &err),
        )
    })?;

    log_info(
        &ctx,
        "objects listed",
        Some(&json!({ "bucket": bucket, "count": objects.len() })),
    );
    Ok(Json(objects))
}

/// `POST /buckets/{bucket_name}/upload` — multipart body with a single `file` part.
pub async fn upload_object(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(bucket): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart
        .map_err(|_| reject(&ctx, "upload rejected", AppError::validation(NO_FILE)))?;

    let upload = read_single_file(&mut multipart)
        .await
        .map_err(|err| reject(&ctx, "upload rejected", err))?
        .ok_or_else(|| reject(&ctx, "upload rejected", AppError::validation(NO_FILE)))?;

    let key = upload.key.clone();
    let size = upload.body.len();
    let receipt = state.objects.put_object(&bucket, upload).await.map_err(|err| {
        reject(
            &ctx,
            "upload failed",
            AppError::dependency("Erro ao enviar arquivo", &err),
        )
    })?;

    log_info(
        &ctx,
        "object uploaded",
        Some(&json!({ "bucket": bucket, "key": key, "size": size, "receipt": receipt })),
    );
    Ok(Json(UploadResponse {
        message: UPLOADED,
        data: receipt,
    }))
}

/// `DELETE /buckets/{bucket_name}/file/{*file_name}`
pub async fn delete_object(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.objects.delete_object(&bucket, &key).await.map_err(|err| {
        reject(
            &ctx,
            "object removal failed",
            AppError::dependency("Erro ao deletar arquivo", &err),
        )
    })?;

    log_info(&ctx, "object removed", Some(&json!({ "bucket": bucket, "key": key })));
    Ok(Json(DeleteResponse { message: DELETED }))
}

/// Buffer the one `file` part of the form.
///
/// Parts under other names, and `file` parts without a file name (or with an
/// empty one, as browsers send for an untouched file input), are skipped.
/// Returns `Ok(None)` when the form carries no file.
async fn read_single_file(multipart: &mut Multipart) -> Result<Option<ObjectUpload>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::validation(format!("{}: {}", NO_FILE, err.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(key) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };
        if upload.is_some() {
            return Err(AppError::validation(MULTIPLE_FILES));
        }

        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|err| AppError::validation(format!("{}: {}", NO_FILE, err.body_text())))?;

        upload = Some(ObjectUpload {
            key,
            content_type,
            body,
        });
    }

    Ok(upload)
}
