//! Handlers for the `/usuarios` collection.
//!
//! Each handler makes exactly one call to the [`UserStore`](crate::services::user_store::UserStore)
//! and logs the outcome against the request.

use crate::{
    errors::AppError,
    handlers::reject,
    logging::{RequestContext, log_info},
    models::user::{NewUser, User},
    services::user_store::UserStoreError,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;

pub const MISSING_FIELDS: &str = "Nome e email são obrigatórios";
pub const NOT_FOUND: &str = "Usuário não encontrado";
pub const INVALID_BODY: &str = "O corpo da requisição deve ser um objeto JSON";
pub const REMOVED: &str = "Usuário removido com sucesso";

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /usuarios`
pub async fn create_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let draft = payload
        .ok()
        .and_then(|Json(body)| body.into_draft())
        .ok_or_else(|| {
            reject(
                &ctx,
                "user creation rejected",
                AppError::validation(MISSING_FIELDS),
            )
        })?;

    let user = state.users.create(draft).await.map_err(|err| {
        reject(
            &ctx,
            "user creation failed",
            AppError::dependency("Erro ao criar usuário", &err),
        )
    })?;

    log_info(&ctx, "user created", Some(&user));
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /usuarios`
pub async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list().await.map_err(|err| {
        reject(
            &ctx,
            "user listing failed",
            AppError::dependency("Erro ao buscar usuários", &err),
        )
    })?;

    log_info(&ctx, "users listed", Some(&serde_json::json!({ "count": users.len() })));
    Ok(Json(users))
}

/// `GET /usuarios/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let found = state.users.find(&id).await.map_err(|err| {
        reject(
            &ctx,
            "user lookup failed",
            store_failure("Erro ao buscar usuário", err),
        )
    })?;

    let user = found
        .ok_or_else(|| reject(&ctx, "user lookup missed", AppError::not_found(NOT_FOUND)))?;

    log_info(&ctx, "user fetched", Some(&user));
    Ok(Json(user))
}

/// `PUT /usuarios/{id}` — merges the body's attributes into the stored record.
pub async fn update_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let patch = match payload {
        Ok(Json(Value::Object(patch))) => patch,
        _ => {
            return Err(reject(
                &ctx,
                "user update rejected",
                AppError::validation(INVALID_BODY),
            ));
        }
    };

    let updated = state.users.update(&id, patch).await.map_err(|err| {
        reject(&ctx, "user update failed", store_failure("Erro ao atualizar usuário", err))
    })?;

    let user = updated
        .ok_or_else(|| reject(&ctx, "user update missed", AppError::not_found(NOT_FOUND)))?;

    log_info(&ctx, "user updated", Some(&user));
    Ok(Json(user))
}

/// `DELETE /usuarios/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.users.delete(&id).await.map_err(|err| {
        reject(&ctx, "user removal failed", store_failure("Erro ao remover usuário", err))
    })?;

    if !removed {
        return Err(reject(
            &ctx,
            "user removal missed",
            AppError::not_found(NOT_FOUND),
        ));
    }

    log_info(&ctx, "user removed", Some(&serde_json::json!({ "_id": id })));
    Ok(Json(MessageResponse { message: REMOVED }))
}

/// Malformed identifiers are reported like any other store failure (500).
fn store_failure(msg: &str, err: UserStoreError) -> AppError {
    AppError::dependency(msg, &err)
}
