// src/db/customer_repo.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    common::error::AppError,
    db::store::{to_document, Collection, CollectionPath, DocumentStore},
    models::{
        customer::{Customer, DadosDoCliente},
        tenancy::TenantScope,
    },
};

// O que vai para o banco na criação: formulário + dono
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCustomerRecord<'a> {
    #[serde(flatten)]
    dados: &'a DadosDoCliente,
    criado_por: &'a str,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CustomerRepository {
    store: Arc<dyn DocumentStore>,
}

impl CustomerRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn collection(scope: &TenantScope) -> CollectionPath {
        CollectionPath::scoped(scope, Collection::Clientes)
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        dados: &DadosDoCliente,
        criado_por: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Customer, AppError> {
        let record = NewCustomerRecord {
            dados,
            criado_por,
            created_at,
        };
        let stored = self
            .store
            .insert(&Self::collection(scope), to_document(&record)?)
            .await?;
        stored.decode()
    }

    pub async fn list(&self, scope: &TenantScope) -> Result<Vec<Customer>, AppError> {
        self.store
            .list(&Self::collection(scope))
            .await?
            .into_iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn find_by_id(
        &self,
        scope: &TenantScope,
        id: &str,
    ) -> Result<Option<Customer>, AppError> {
        self.store
            .get(&Self::collection(scope), id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Sobrescreve todos os campos do formulário; `id`, `criadoPor` e `createdAt` ficam.
    pub async fn update(
        &self,
        scope: &TenantScope,
        id: &str,
        dados: &DadosDoCliente,
    ) -> Result<Option<Customer>, AppError> {
        self.store
            .update(&Self::collection(scope), id, to_document(dados)?)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn delete(&self, scope: &TenantScope, id: &str) -> Result<bool, AppError> {
        self.store.delete(&Self::collection(scope), id).await
    }
}
