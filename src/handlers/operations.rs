// src/handlers/operations.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::CurrentTenant,
    models::operation::{DadosDaOperacao, Operation, OperationFilter},
    services::export::{content_disposition, to_export_rows, write_xlsx, EXPORT_CONTENT_TYPE},
};

// POST /api/operations
#[utoipa::path(
    post,
    path = "/api/operations",
    tag = "Operações",
    request_body = DadosDaOperacao,
    responses(
        (status = 201, description = "Operação cadastrada", body = Operation),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_operation(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Json(payload): Json<DadosDaOperacao>,
) -> Result<impl IntoResponse, AppError> {
    let operation = app_state
        .operation_service
        .create(tenant.context(), payload)
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok((StatusCode::CREATED, Json(operation)))
}

// GET /api/operations
#[utoipa::path(
    get,
    path = "/api/operations",
    tag = "Operações",
    params(OperationFilter),
    responses(
        (status = 200, description = "Operações visíveis, mais recentes primeiro", body = Vec<Operation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_operations(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Query(filter): Query<OperationFilter>,
) -> Result<impl IntoResponse, AppError> {
    let operations = app_state
        .operation_service
        .list(tenant.context(), &filter)
        .await?;
    Ok((StatusCode::OK, Json(operations)))
}

// GET /api/operations/export
#[utoipa::path(
    get,
    path = "/api/operations/export",
    tag = "Operações",
    params(OperationFilter),
    responses(
        (status = 200, description = "Planilha .xlsx das operações filtradas", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_operations(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Query(filter): Query<OperationFilter>,
) -> Result<impl IntoResponse, AppError> {
    let operations = app_state
        .operation_service
        .list(tenant.context(), &filter)
        .await?;
    let body = write_xlsx(&to_export_rows(&operations))?;

    tracing::info!(linhas = operations.len(), "📄 Exportação de operações gerada");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition()),
        ],
        body,
    ))
}

// GET /api/operations/{id}
#[utoipa::path(
    get,
    path = "/api/operations/{id}",
    tag = "Operações",
    params(("id" = String, Path, description = "ID da operação")),
    responses(
        (status = 200, description = "Operação", body = Operation),
        (status = 404, description = "Operação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_operation(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let operation = app_state
        .operation_service
        .get(tenant.context(), &id)
        .await?
        .ok_or_else(|| AppError::not_found("Operação"))?;

    Ok((StatusCode::OK, Json(operation)))
}

// PUT /api/operations/{id}
#[utoipa::path(
    put,
    path = "/api/operations/{id}",
    tag = "Operações",
    params(("id" = String, Path, description = "ID da operação")),
    request_body = DadosDaOperacao,
    responses(
        (status = 200, description = "Operação atualizada", body = Operation),
        (status = 403, description = "Operação de outro colaborador"),
        (status = 404, description = "Operação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_operation(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<String>,
    Json(payload): Json<DadosDaOperacao>,
) -> Result<impl IntoResponse, AppError> {
    let operation = app_state
        .operation_service
        .update(tenant.context(), &id, payload)
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok((StatusCode::OK, Json(operation)))
}

// DELETE /api/operations/{id}
#[utoipa::path(
    delete,
    path = "/api/operations/{id}",
    tag = "Operações",
    params(("id" = String, Path, description = "ID da operação")),
    responses(
        (status = 204, description = "Operação excluída"),
        (status = 403, description = "Operação de outro colaborador"),
        (status = 404, description = "Operação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_operation(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .operation_service
        .delete(tenant.context(), &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
