// src/handlers/dashboard.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{stream, Stream};

use crate::{
    common::error::AppError,
    config::AppState,
    db::Collection,
    middleware::tenancy::CurrentTenant,
    models::dashboard::{MonthlyParams, MonthlySummary},
    services::dashboard_service::MonthlyCountView,
};

// GET /api/dashboard/{collection}/monthly
#[utoipa::path(
    get,
    path = "/api/dashboard/{collection}/monthly",
    tag = "Dashboard",
    params(
        ("collection" = Collection, Path, description = "clientes ou operacoes"),
        MonthlyParams
    ),
    responses(
        (status = 200, description = "Registros deste mês contra o mês anterior", body = MonthlySummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_monthly_summary(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(collection): Path<Collection>,
    Query(params): Query<MonthlyParams>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .dashboard_service
        .monthly_summary(tenant.context(), collection, params.collaborator_uid.as_deref())
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/{collection}/monthly/live
#[utoipa::path(
    get,
    path = "/api/dashboard/{collection}/monthly/live",
    tag = "Dashboard",
    params(
        ("collection" = Collection, Path, description = "clientes ou operacoes"),
        MonthlyParams
    ),
    responses(
        (status = 200, description = "Um evento `summary` a cada mudança nas contagens",
         content_type = "text/event-stream", body = MonthlySummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_monthly_summary(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
    Path(collection): Path<Collection>,
    Query(params): Query<MonthlyParams>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let view = app_state.dashboard_service.watch_monthly(
        tenant.context(),
        collection,
        params.collaborator_uid.as_deref(),
    );
    Sse::new(summary_events(view)).keep_alive(KeepAlive::default())
}

// Quando o cliente desconecta o stream é descartado e a visão junto
fn summary_events(view: MonthlyCountView) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold((view, false), |(mut view, started)| async move {
        let summary = if started {
            view.changed().await
        } else {
            view.first().await
        }?;
        let event = Event::default().event("summary").json_data(summary);
        Some((event, (view, true)))
    })
}
