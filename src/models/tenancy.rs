// src/models/tenancy.rs

use std::fmt;

use crate::models::auth::Actor;

/// O identificador sob o qual ficam todos os registros da organização do ator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantScope(String);

impl TenantScope {
    /// Colaboradores gravam sob o uid do gerente; donos de conta, sob o próprio uid.
    /// Sem ator autenticado não existe escopo.
    pub fn resolve(actor: Option<&Actor>) -> Option<Self> {
        let actor = actor?;
        let id = actor.gerente_uid.as_deref().unwrap_or(&actor.uid);
        if id.is_empty() {
            return None;
        }
        Some(Self(id.to_string()))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Ator + escopo resolvido uma única vez por requisição e passado adiante explicitamente
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub actor: Actor,
    pub scope: TenantScope,
}

impl TenantContext {
    pub fn from_actor(actor: Option<Actor>) -> Option<Self> {
        let scope = TenantScope::resolve(actor.as_ref())?;
        actor.map(|actor| Self { actor, scope })
    }

    pub fn uid(&self) -> &str {
        &self.actor.uid
    }
}
