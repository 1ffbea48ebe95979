// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState};

// Valida o Bearer e deixa o `Actor` nos extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = auth_header.ok_or(AppError::InvalidToken)?;

    let actor = app_state.auth_service.validate_token(bearer.token()).await?;
    tracing::debug!(uid = %actor.uid, gerente = ?actor.gerente_uid, "Requisição autenticada");

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
