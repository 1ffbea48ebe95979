// src/middleware/tenancy.rs

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::models::{auth::Actor, tenancy::TenantContext};

// Ator + escopo da requisição. `None` quando não há ator autenticado:
// os serviços tratam isso como "não faz nada".
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Option<TenantContext>);

impl CurrentTenant {
    pub fn context(&self) -> Option<&TenantContext> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts.extensions.get::<Actor>().cloned();
        Ok(CurrentTenant(TenantContext::from_actor(actor)))
    }
}
