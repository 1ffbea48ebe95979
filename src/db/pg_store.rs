// src/db/pg_store.rs

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgListener, types::Json, PgPool, Postgres, QueryBuilder};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{CollectionPath, Document, DocumentStore, FilterOp, Query, StoredDocument},
};

/// Canal do LISTEN/NOTIFY alimentado pelo trigger da tabela `documents`.
pub const CHANGES_CHANNEL: &str = "documents_changed";
const CHANGES_CAPACITY: usize = 1024;

// Cada linha: (id, data)
type Row = (String, Json<Document>);

fn to_stored((id, Json(data)): Row) -> StoredDocument {
    StoredDocument { id, data }
}

/// Documentos JSONB no Postgres. As mudanças chegam pelo `PgListener`,
/// inclusive as feitas por outras instâncias do serviço.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<CollectionPath>,
}

impl PgDocumentStore {
    pub async fn connect(pool: PgPool) -> Result<Self, AppError> {
        let (changes, _) = broadcast::channel(CHANGES_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(CHANGES_CHANNEL).await?;
        tracing::info!("👂 Escutando mudanças em '{}'", CHANGES_CHANNEL);

        let tx = changes.clone();
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        let _ = tx.send(CollectionPath::from_raw(notification.payload()));
                    }
                    Err(e) => {
                        // O PgListener reconecta sozinho na próxima chamada
                        tracing::error!("🔥 Falha no listener de mudanças: {:?}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(Self { pool, changes })
    }

    fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a Query) {
        for filter in &query.filters {
            builder.push(" AND ");
            let field = filter.field.as_str();
            match (filter.op, &filter.value) {
                (FilterOp::Eq, value) => {
                    builder
                        .push("data -> ")
                        .push_bind(field)
                        .push(" = ")
                        .push_bind(Json(value.clone()));
                }
                (op, Value::Number(n)) => {
                    // CASE garante que o cast só roda em campos numéricos
                    builder
                        .push("CASE WHEN jsonb_typeof(data -> ")
                        .push_bind(field)
                        .push(") = 'number' THEN (data ->> ")
                        .push_bind(field)
                        .push(")::float8 ")
                        .push(comparison(op))
                        .push(" ")
                        .push_bind(n.as_f64().unwrap_or_default())
                        .push(" ELSE false END");
                }
                (op, Value::String(s)) => {
                    builder
                        .push("(jsonb_typeof(data -> ")
                        .push_bind(field)
                        .push(") = 'string' AND (data ->> ")
                        .push_bind(field)
                        .push(") COLLATE \"C\" ")
                        .push(comparison(op))
                        .push(" ")
                        .push_bind(s.as_str())
                        .push(")");
                }
                (op, value) => {
                    builder
                        .push("data -> ")
                        .push_bind(field)
                        .push(" ")
                        .push(comparison(op))
                        .push(" ")
                        .push_bind(Json(value.clone()));
                }
            }
        }
    }
}

fn comparison(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Gte => ">=",
        FilterOp::Lte => "<=",
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(
        &self,
        collection: &CollectionPath,
        mut data: Document,
    ) -> Result<StoredDocument, AppError> {
        let id = Uuid::new_v4().to_string();
        data.insert("id".to_string(), Value::String(id.clone()));

        let row = sqlx::query_as::<_, Row>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            RETURNING id, data
            "#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Json(&data))
        .fetch_one(&self.pool)
        .await?;

        Ok(to_stored(row))
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        mut data: Document,
    ) -> Result<StoredDocument, AppError> {
        data.insert("id".to_string(), Value::String(id.to_string()));

        let row = sqlx::query_as::<_, Row>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
            RETURNING id, data
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&data))
        .fetch_one(&self.pool)
        .await?;

        Ok(to_stored(row))
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, AppError> {
        let row = sqlx::query_as::<_, Row>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(to_stored))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<StoredDocument>, AppError> {
        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, data FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(to_stored).collect())
    }

    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(query.collection.as_str());
        Self::push_filters(&mut builder, query);
        builder.push(" ORDER BY created_at ASC, id ASC");

        let rows = builder
            .build_query_as::<Row>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(to_stored).collect())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Document,
    ) -> Result<Option<StoredDocument>, AppError> {
        // `||` faz o merge dos campos de primeiro nível
        let row = sqlx::query_as::<_, Row>(
            r#"
            UPDATE documents SET data = data || $3
            WHERE collection = $1 AND id = $2
            RETURNING id, data
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&fields))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(to_stored))
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn changes(&self) -> broadcast::Receiver<CollectionPath> {
        self.changes.subscribe()
    }
}
