// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::CurrentTenant,
    models::user::{NewCollaboratorPayload, TipoDeOperacao, UpdateProfilePayload, UserProfile},
};

// =============================================================================
//  PERFIL
// =============================================================================

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Usuários",
    responses(
        (status = 200, description = "Perfil do usuário autenticado", body = UserProfile),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .user_service
        .me(tenant.context())
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok((StatusCode::OK, Json(profile)))
}

// PUT /api/users/me
#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "Usuários",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = UserProfile),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .user_service
        .update_me(tenant.context(), payload)
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok((StatusCode::OK, Json(profile)))
}

// =============================================================================
//  COLABORADORES
// =============================================================================

// GET /api/users/collaborators
#[utoipa::path(
    get,
    path = "/api/users/collaborators",
    tag = "Usuários",
    responses(
        (status = 200, description = "Colaboradores da equipe", body = Vec<UserProfile>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_collaborators(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<impl IntoResponse, AppError> {
    let collaborators = app_state
        .user_service
        .list_collaborators(tenant.context())
        .await?;
    Ok((StatusCode::OK, Json(collaborators)))
}

// POST /api/users/collaborators
#[utoipa::path(
    post,
    path = "/api/users/collaborators",
    tag = "Usuários",
    request_body = NewCollaboratorPayload,
    responses(
        (status = 201, description = "Convite enviado ou colaborador atualizado", body = UserProfile),
        (status = 403, description = "Apenas o gerente pode cadastrar")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_collaborator(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Json(payload): Json<NewCollaboratorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .user_service
        .add_collaborator(tenant.context(), payload)
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

// POST /api/users/invite/accept
#[utoipa::path(
    post,
    path = "/api/users/invite/accept",
    tag = "Usuários",
    responses(
        (status = 200, description = "Convite aceito", body = UserProfile),
        (status = 403, description = "A conta já tem dados ou equipe própria"),
        (status = 404, description = "Nenhum convite pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_invite(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .user_service
        .accept_invite(tenant.context())
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok((StatusCode::OK, Json(profile)))
}

// DELETE /api/users/invite
#[utoipa::path(
    delete,
    path = "/api/users/invite",
    tag = "Usuários",
    responses(
        (status = 200, description = "Convite recusado", body = UserProfile),
        (status = 404, description = "Nenhum convite pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn decline_invite(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .user_service
        .decline_invite(tenant.context())
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok((StatusCode::OK, Json(profile)))
}

// =============================================================================
//  TIPOS DE OPERAÇÃO
// =============================================================================

// GET /api/users/operation-types
#[utoipa::path(
    get,
    path = "/api/users/operation-types",
    tag = "Usuários",
    responses(
        (status = 200, description = "Tipos de operação da equipe", body = Vec<TipoDeOperacao>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_operation_types(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<impl IntoResponse, AppError> {
    let tipos = app_state
        .user_service
        .list_operation_types(tenant.context())
        .await?;
    Ok((StatusCode::OK, Json(tipos)))
}

// POST /api/users/operation-types
#[utoipa::path(
    post,
    path = "/api/users/operation-types",
    tag = "Usuários",
    request_body = TipoDeOperacao,
    responses(
        (status = 200, description = "Lista atualizada", body = Vec<TipoDeOperacao>),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_operation_type(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Json(payload): Json<TipoDeOperacao>,
) -> Result<impl IntoResponse, AppError> {
    let tipos = app_state
        .user_service
        .add_operation_type(tenant.context(), payload)
        .await?;
    Ok((StatusCode::OK, Json(tipos)))
}

// DELETE /api/users/operation-types/{name}
#[utoipa::path(
    delete,
    path = "/api/users/operation-types/{name}",
    tag = "Usuários",
    params(("name" = String, Path, description = "Nome do tipo")),
    responses(
        (status = 200, description = "Lista atualizada", body = Vec<TipoDeOperacao>),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Tipo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_operation_type(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tipos = app_state
        .user_service
        .remove_operation_type(tenant.context(), &name)
        .await?;
    Ok((StatusCode::OK, Json(tipos)))
}
