// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,

        // --- Usuários ---
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::list_collaborators,
        handlers::users::add_collaborator,
        handlers::users::accept_invite,
        handlers::users::decline_invite,
        handlers::users::list_operation_types,
        handlers::users::add_operation_type,
        handlers::users::remove_operation_type,

        // --- Clientes ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Operações ---
        handlers::operations::create_operation,
        handlers::operations::list_operations,
        handlers::operations::export_operations,
        handlers::operations::get_operation,
        handlers::operations::update_operation,
        handlers::operations::delete_operation,

        // --- Dashboard ---
        handlers::dashboard::get_monthly_summary,
        handlers::dashboard::stream_monthly_summary,

        // --- Notificações ---
        handlers::notifications::stream_notifications,
    ),
    components(
        schemas(
            // --- Usuários ---
            models::user::Permissoes,
            models::user::TipoDeOperacao,
            models::user::ConviteDeEquipe,
            models::user::UserProfile,
            models::user::UpdateProfilePayload,
            models::user::NewCollaboratorPayload,

            // --- Clientes ---
            models::customer::DadosDoCliente,
            models::customer::Customer,
            models::customer::CustomerDeletion,

            // --- Operações ---
            models::operation::StatusDaOperacao,
            models::operation::DadosDaOperacao,
            models::operation::Operation,

            // --- Dashboard ---
            crate::db::Collection,
            models::dashboard::MonthlySummary,

            // --- Notificações ---
            crate::services::notification::Severity,
            crate::services::notification::Notification,
        )
    ),
    tags(
        (name = "Health", description = "Estado do serviço"),
        (name = "Usuários", description = "Perfil, Equipe e Tipos de Operação"),
        (name = "Clientes", description = "Cadastro de Clientes"),
        (name = "Operações", description = "Operações de Crédito e Exportação"),
        (name = "Dashboard", description = "Cards Mensais ao Vivo"),
        (name = "Notificações", description = "Avisos para o Usuário")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
