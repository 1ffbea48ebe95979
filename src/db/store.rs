// src/db/store.rs

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::{common::error::AppError, models::tenancy::TenantScope};

/// Um documento: objeto JSON de primeiro nível.
pub type Document = Map<String, Value>;

// Segmento fixo entre o escopo e o nome da coleção: {escopo}/data/{coleção}
const DATA_SEGMENT: &str = "data";
const USERS_COLLECTION: &str = "users";

// =========================================================================
//  CAMINHOS
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Clientes,
    Operacoes,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Clientes => "clientes",
            Collection::Operacoes => "operacoes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn scoped(scope: &TenantScope, collection: Collection) -> Self {
        Self(format!("{}/{}/{}", scope.id(), DATA_SEGMENT, collection.as_str()))
    }

    /// Coleção raiz com os perfis de usuário (fora de qualquer escopo)
    pub fn users() -> Self {
        Self(USERS_COLLECTION.to_string())
    }

    /// Caminho já montado, como chega nas notificações do Postgres
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================================
//  DOCUMENTOS
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

impl StoredDocument {
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, AppError> {
        Ok(serde_json::from_value(Value::Object(self.data))?)
    }
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InternalServerError(anyhow::anyhow!(
            "documento precisa ser um objeto JSON, recebido: {}",
            other
        ))),
    }
}

// =========================================================================
//  CONSULTAS
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => {
                actual == &self.value || compare(actual, &self.value) == Some(Ordering::Equal)
            }
            FilterOp::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

// Números comparam numericamente e strings lexicograficamente; tipos diferentes não comparam.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
        }
    }

    fn push(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Eq, value)
    }

    pub fn where_gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Gte, value)
    }

    pub fn where_lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Lte, value)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

// =========================================================================
//  O BANCO DE DOCUMENTOS
// =========================================================================

/// Banco hierárquico de documentos JSON.
///
/// Toda escrita avisa no canal de `changes()` qual coleção mudou; é isso que
/// alimenta as consultas ao vivo de [`crate::db::live`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Grava um novo documento. O banco gera o id e o escreve no campo `id`
    /// do próprio documento na mesma escrita.
    async fn insert(&self, collection: &CollectionPath, data: Document)
        -> Result<StoredDocument, AppError>;

    /// Grava (ou substitui) um documento com id conhecido.
    async fn set(&self, collection: &CollectionPath, id: &str, data: Document)
        -> Result<StoredDocument, AppError>;

    async fn get(&self, collection: &CollectionPath, id: &str)
        -> Result<Option<StoredDocument>, AppError>;

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<StoredDocument>, AppError>;

    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, AppError>;

    /// Sobrescreve os campos de primeiro nível informados. `Ok(None)` se o documento não existe.
    async fn update(&self, collection: &CollectionPath, id: &str, fields: Document)
        -> Result<Option<StoredDocument>, AppError>;

    /// `true` se havia algo para apagar.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, AppError>;

    fn changes(&self) -> broadcast::Receiver<CollectionPath>;
}
