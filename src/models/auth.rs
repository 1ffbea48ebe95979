// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::user::{Permissoes, UserProfile};

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (uid do usuário no provedor)
    pub exp: usize,  // Expiration time
    pub iat: usize,  // Issued At
}

/// O usuário autenticado da requisição, já com o vínculo de gerente resolvido.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub uid: String,
    pub gerente_uid: Option<String>,
    pub permissoes: Permissoes,
}

impl Actor {
    /// Dono de conta, sem gerente e com todas as permissões.
    pub fn owner(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            gerente_uid: None,
            permissoes: Permissoes::all(),
        }
    }

    pub fn collaborator(
        uid: impl Into<String>,
        gerente_uid: impl Into<String>,
        permissoes: Permissoes,
    ) -> Self {
        Self {
            uid: uid.into(),
            gerente_uid: Some(gerente_uid.into()),
            permissoes,
        }
    }

    /// Monta o ator a partir do perfil salvo. Sem perfil, o usuário é dono da própria conta.
    pub fn from_profile(uid: &str, profile: Option<&UserProfile>) -> Self {
        match profile.and_then(|p| p.gerente_uid.clone().map(|g| (g, p.permissoes.clone()))) {
            Some((gerente_uid, permissoes)) => Self::collaborator(uid, gerente_uid, permissoes),
            None => Self::owner(uid),
        }
    }

    pub fn is_collaborator(&self) -> bool {
        self.gerente_uid.is_some()
    }

    pub fn can_manage_others_operations(&self) -> bool {
        !self.is_collaborator() || self.permissoes.gerenciar_operacoes_de_outros
    }

    pub fn can_manage_operation_types(&self) -> bool {
        !self.is_collaborator() || self.permissoes.gerenciar_tipo_de_operacoes
    }
}
