// src/db/user_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::store::{to_document, CollectionPath, DocumentStore, Query},
    models::user::UserProfile,
};

// O repositório de perfis, responsável pela coleção raiz 'users'
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // Busca um perfil pelo uid
    pub async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.store
            .get(&CollectionPath::users(), uid)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    // Cria ou substitui o perfil inteiro
    pub async fn save(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        self.store
            .set(&CollectionPath::users(), &profile.id, to_document(profile)?)
            .await?
            .decode()
    }

    // Todos os colaboradores ligados a um gerente
    pub async fn list_by_gerente(&self, gerente_uid: &str) -> Result<Vec<UserProfile>, AppError> {
        let query = Query::new(CollectionPath::users()).where_eq("gerenteUid", gerente_uid);
        self.store
            .query(&query)
            .await?
            .into_iter()
            .map(|doc| doc.decode())
            .collect()
    }
}
