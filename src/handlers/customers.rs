// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::CurrentTenant,
    models::customer::{Customer, CustomerDeletion, DadosDoCliente},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteCustomerParams {
    /// Também apaga as operações do cliente
    #[serde(default)]
    pub cascade: bool,
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Clientes",
    request_body = DadosDoCliente,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Json(payload): Json<DadosDoCliente>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .create(tenant.context(), payload)
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Clientes",
    responses(
        (status = 200, description = "Clientes do escopo", body = Vec<Customer>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list(tenant.context()).await?;
    Ok((StatusCode::OK, Json(customers)))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .get(tenant.context(), &id)
        .await?
        .ok_or_else(|| AppError::not_found("Cliente"))?;

    Ok((StatusCode::OK, Json(customer)))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do cliente")),
    request_body = DadosDoCliente,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<String>,
    Json(payload): Json<DadosDoCliente>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .update(tenant.context(), &id, payload)
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok((StatusCode::OK, Json(customer)))
}

// DELETE /api/customers/{id}?cascade=true
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Clientes",
    params(
        ("id" = String, Path, description = "ID do cliente"),
        DeleteCustomerParams
    ),
    responses(
        (status = 200, description = "Cliente excluído", body = CustomerDeletion),
        (status = 403, description = "Cascata atingiria operações de outros colaboradores"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<String>,
    Query(params): Query<DeleteCustomerParams>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .customer_service
        .delete(tenant.context(), &id, params.cascade)
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok((StatusCode::OK, Json(outcome)))
}
