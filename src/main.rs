//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;
    let bind_addr = app_state.config.bind_addr.clone();

    let app = build_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/me",
            get(handlers::users::get_me).put(handlers::users::update_me),
        )
        .route(
            "/collaborators",
            get(handlers::users::list_collaborators).post(handlers::users::add_collaborator),
        )
        .route("/invite", delete(handlers::users::decline_invite))
        .route("/invite/accept", post(handlers::users::accept_invite))
        .route(
            "/operation-types",
            get(handlers::users::list_operation_types).post(handlers::users::add_operation_type),
        )
        .route(
            "/operation-types/{name}",
            delete(handlers::users::remove_operation_type),
        );

    let customer_routes = Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        );

    let operation_routes = Router::new()
        .route(
            "/",
            get(handlers::operations::list_operations).post(handlers::operations::create_operation),
        )
        .route("/export", get(handlers::operations::export_operations))
        .route(
            "/{id}",
            get(handlers::operations::get_operation)
                .put(handlers::operations::update_operation)
                .delete(handlers::operations::delete_operation),
        );

    let dashboard_routes = Router::new()
        .route(
            "/{collection}/monthly",
            get(handlers::dashboard::get_monthly_summary),
        )
        .route(
            "/{collection}/monthly/live",
            get(handlers::dashboard::stream_monthly_summary),
        );

    let notification_routes = Router::new().route(
        "/stream",
        get(handlers::notifications::stream_notifications),
    );

    // Tudo abaixo de /api exige token, menos o health
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/customers", customer_routes)
        .nest("/operations", operation_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/notifications", notification_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api", protected)
        .with_state(app_state)
}
