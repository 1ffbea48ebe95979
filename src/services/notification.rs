// src/services/notification.rs

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::common::error::AppError;

pub const DEFAULT_DURATION_MS: u64 = 5000;
const CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Destructive,
}

// O "toast" que o painel mostra
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// uid de quem deve ver a notificação
    #[serde(skip)]
    pub recipient: String,
    pub title: String,
    pub severity: Severity,
    pub duration_ms: u64,
}

/// Saída de notificações: registra no log e repassa para quem estiver ouvindo.
/// Nunca bloqueia nem falha; sem ouvintes a notificação só fica no log.
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self { tx }
    }

    pub fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => {
                tracing::info!(recipient = %notification.recipient, "🔔 {}", notification.title)
            }
            Severity::Destructive => {
                tracing::warn!(recipient = %notification.recipient, "🔔 {}", notification.title)
            }
        }
        let _ = self.tx.send(notification);
    }

    pub fn success(&self, recipient: &str, title: &str) {
        self.notify(Notification {
            recipient: recipient.to_string(),
            title: title.to_string(),
            severity: Severity::Success,
            duration_ms: DEFAULT_DURATION_MS,
        });
    }

    pub fn failure(&self, recipient: &str, title: &str) {
        self.notify(Notification {
            recipient: recipient.to_string(),
            title: title.to_string(),
            severity: Severity::Destructive,
            duration_ms: DEFAULT_DURATION_MS,
        });
    }

    /// Notifica o resultado de uma escrita e devolve o próprio resultado.
    /// Erros de validação não viram toast: o formulário já mostra os campos.
    pub fn report<T>(
        &self,
        recipient: &str,
        result: Result<T, AppError>,
        success: &str,
        failure: &str,
    ) -> Result<T, AppError> {
        match &result {
            Ok(_) => self.success(recipient, success),
            Err(AppError::ValidationError(_)) => {}
            Err(e) => {
                tracing::error!("🔥 {}: {:?}", failure, e);
                self.failure(recipient, failure);
            }
        }
        result
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_notifies_success_and_failure() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();

        let ok: Result<u8, AppError> = hub.report("u1", Ok(1), "Feito!", "Falhou!");
        assert_eq!(ok.unwrap(), 1);
        let first = rx.recv().await.unwrap();
        assert_eq!(first.title, "Feito!");
        assert_eq!(first.severity, Severity::Success);
        assert_eq!(first.recipient, "u1");
        assert_eq!(first.duration_ms, DEFAULT_DURATION_MS);

        let err: Result<u8, AppError> =
            hub.report("u1", Err(AppError::not_found("Cliente")), "Feito!", "Falhou!");
        assert!(err.is_err());
        let second = rx.recv().await.unwrap();
        assert_eq!(second.severity, Severity::Destructive);
    }

    #[tokio::test]
    async fn validation_errors_are_not_toasted() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();
        let err: Result<(), AppError> = hub.report(
            "u1",
            Err(AppError::ValidationError(validator::ValidationErrors::new())),
            "Feito!",
            "Falhou!",
        );
        assert!(err.is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn notify_without_listeners_does_not_fail() {
        NotificationHub::new().success("u1", "Ninguém ouvindo");
    }
}
