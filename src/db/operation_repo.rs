// src/db/operation_repo.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    common::error::AppError,
    db::store::{to_document, Collection, CollectionPath, DocumentStore, Query},
    models::{
        operation::{DadosDaOperacao, Operation},
        tenancy::TenantScope,
    },
};

// Campos derivados, recalculados em toda escrita
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationFields<'a> {
    #[serde(flatten)]
    dados: &'a DadosDaOperacao,
    cliente: &'a str,
    valor_recebido: Decimal,
}

impl<'a> OperationFields<'a> {
    fn new(dados: &'a DadosDaOperacao, cliente: &'a str) -> Self {
        Self {
            dados,
            cliente,
            valor_recebido: dados.valor_recebido(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewOperationRecord<'a> {
    #[serde(flatten)]
    fields: OperationFields<'a>,
    criado_por: &'a str,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct OperationRepository {
    store: Arc<dyn DocumentStore>,
}

impl OperationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn collection(scope: &TenantScope) -> CollectionPath {
        CollectionPath::scoped(scope, Collection::Operacoes)
    }

    /// Grava a operação com `valorRecebido` calculado e o nome do cliente copiado.
    pub async fn create(
        &self,
        scope: &TenantScope,
        dados: &DadosDaOperacao,
        cliente: &str,
        criado_por: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Operation, AppError> {
        let record = NewOperationRecord {
            fields: OperationFields::new(dados, cliente),
            criado_por,
            created_at,
        };
        let stored = self
            .store
            .insert(&Self::collection(scope), to_document(&record)?)
            .await?;
        stored.decode()
    }

    pub async fn list(&self, scope: &TenantScope) -> Result<Vec<Operation>, AppError> {
        self.store
            .list(&Self::collection(scope))
            .await?
            .into_iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn list_by_cliente(
        &self,
        scope: &TenantScope,
        cliente_id: &str,
    ) -> Result<Vec<Operation>, AppError> {
        let query = Query::new(Self::collection(scope)).where_eq("clienteId", cliente_id);
        self.store
            .query(&query)
            .await?
            .into_iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn find_by_id(
        &self,
        scope: &TenantScope,
        id: &str,
    ) -> Result<Option<Operation>, AppError> {
        self.store
            .get(&Self::collection(scope), id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        id: &str,
        dados: &DadosDaOperacao,
        cliente: &str,
    ) -> Result<Option<Operation>, AppError> {
        let fields = OperationFields::new(dados, cliente);
        self.store
            .update(&Self::collection(scope), id, to_document(&fields)?)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn delete(&self, scope: &TenantScope, id: &str) -> Result<bool, AppError> {
        self.store.delete(&Self::collection(scope), id).await
    }
}
