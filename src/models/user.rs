// src/models/user.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissoes {
    /// Pode ver e alterar operações criadas por outros colaboradores
    pub gerenciar_operacoes_de_outros: bool,
    /// Pode adicionar/remover tipos de operação
    pub gerenciar_tipo_de_operacoes: bool,
}

impl Permissoes {
    pub fn all() -> Self {
        Self {
            gerenciar_operacoes_de_outros: true,
            gerenciar_tipo_de_operacoes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipoDeOperacao {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Consignado INSS")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "#22c55e")]
    pub color: String,
}

// O vínculo só passa a valer quando o próprio convidado aceita
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConviteDeEquipe {
    pub gerente_uid: String,
    pub nome: String,
    #[serde(default)]
    pub permissoes: Permissoes,
}

// Perfil guardado na coleção raiz `users`, chaveado pelo uid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub gerente_uid: Option<String>,
    #[serde(default)]
    pub permissoes: Permissoes,
    #[serde(default)]
    pub tipos_de_operacoes: Vec<TipoDeOperacao>,
    /// Convite pendente para entrar na equipe de um gerente
    #[serde(default)]
    pub convite: Option<ConviteDeEquipe>,
}

impl UserProfile {
    pub fn empty(uid: impl Into<String>) -> Self {
        Self {
            id: uid.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria Souza")]
    pub nome: String,

    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCollaboratorPayload {
    /// uid do colaborador no provedor de autenticação
    #[validate(length(min = 1, message = "required"))]
    pub uid: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "João Lima")]
    pub nome: String,

    #[serde(default)]
    pub permissoes: Permissoes,
}
