// src/services/auth.rs
// Os tokens são emitidos pelo provedor de autenticação; aqui só validamos.

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Actor, Claims},
    services::user_service::UserService,
};

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: UserService, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    /// Valida o token e monta o ator com o vínculo de gerente já resolvido.
    pub async fn validate_token(&self, token: &str) -> Result<Actor, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {:?}", e);
            AppError::InvalidToken
        })?
        .claims;

        if claims.sub.is_empty() {
            return Err(AppError::InvalidToken);
        }

        self.users.load_actor(&claims.sub).await
    }
}
