// src/handlers/notifications.rs

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream, Stream};
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::{
    config::AppState, middleware::tenancy::CurrentTenant,
    services::notification::Notification,
};

// GET /api/notifications/stream
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    tag = "Notificações",
    responses(
        (status = 200, description = "Toasts destinados ao usuário autenticado",
         content_type = "text/event-stream", body = Notification)
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_notifications(
    State(app_state): State<AppState>,
    tenant: CurrentTenant,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let recipient = tenant.context().map(|t| t.uid().to_string());
    let rx = app_state.notifier.subscribe();
    Sse::new(notification_events(rx, recipient)).keep_alive(KeepAlive::default())
}

fn notification_events(
    rx: Receiver<Notification>,
    recipient: Option<String>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold((rx, recipient), |(mut rx, recipient)| async move {
        // Sem usuário não há o que entregar
        let uid = recipient.clone()?;
        loop {
            match rx.recv().await {
                Ok(notification) if notification.recipient == uid => {
                    let event = Event::default().event("notification").json_data(&notification);
                    return Some((event, (rx, recipient)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Stream de notificações perdeu {} mensagens", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
