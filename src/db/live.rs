// src/db/live.rs

use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;

use crate::db::store::{DocumentStore, Query, StoredDocument};

type Snapshot = Option<Vec<StoredDocument>>;

/// Consulta ao vivo: entrega o conjunto completo de resultados a cada mudança.
///
/// A tarefa que acompanha a consulta é abortada quando a assinatura é
/// cancelada ou descartada; depois disso nenhum snapshot é entregue.
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Espera o próximo snapshot. `None` quando a consulta terminou.
    pub async fn next_snapshot(&mut self) -> Option<Vec<StoredDocument>> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(docs) = self.rx.borrow_and_update().clone() {
                return Some(docs);
            }
        }
    }

    /// O último snapshot entregue, se já houve algum.
    pub fn latest(&self) -> Option<Vec<StoredDocument>> {
        self.rx.borrow().clone()
    }

    pub fn cancel(self) {
        // Drop faz o resto
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn subscribe(store: Arc<dyn DocumentStore>, query: Query) -> Subscription {
    let (tx, rx) = watch::channel(None);
    let task = tokio::spawn(run_live_query(store, query, tx));
    Subscription { rx, task }
}

async fn run_live_query(
    store: Arc<dyn DocumentStore>,
    query: Query,
    tx: watch::Sender<Snapshot>,
) {
    // Assina as mudanças antes da primeira leitura para não perder nada no meio
    let mut changes = store.changes();

    loop {
        let docs = match store.query(&query).await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::error!("🔥 Consulta ao vivo em '{}' falhou: {:?}", query.collection, e);
                return;
            }
        };

        // Só publica quando o resultado realmente mudou
        tx.send_if_modified(|current| {
            if current.as_ref() == Some(&docs) {
                false
            } else {
                *current = Some(docs);
                true
            }
        });

        loop {
            tokio::select! {
                _ = tx.closed() => return,
                event = changes.recv() => match event {
                    Ok(path) if path == query.collection => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Consulta ao vivo atrasou {} eventos, relendo", skipped);
                        break;
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
    }
}
