// src/services/dashboard_service.rs

use std::sync::Arc;

use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{
    common::error::AppError,
    db::{
        live::{self, Subscription},
        Collection, CollectionPath, DocumentStore, Query,
    },
    models::{
        dashboard::MonthlySummary,
        tenancy::{TenantContext, TenantScope},
    },
};

const CREATED_AT: &str = "createdAt";

/// Intervalo fechado de um mês civil, em epoch ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// O mês civil `months_back` meses antes do de `now`, no fuso de `now`.
/// Janeiro menos um é dezembro do ano anterior.
pub fn month_window(now: DateTime<FixedOffset>, months_back: u32) -> Option<MonthWindow> {
    let total = i64::from(now.year()) * 12 + i64::from(now.month0()) - i64::from(months_back);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;

    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let offset = *now.offset();
    let midnight_ms = |day: NaiveDate| -> Option<i64> {
        day.and_hms_opt(0, 0, 0)?
            .and_local_timezone(offset)
            .single()
            .map(|dt| dt.timestamp_millis())
    };

    Some(MonthWindow {
        start_ms: midnight_ms(start)?,
        end_ms: midnight_ms(next)? - 1,
    })
}

fn window_query(
    scope: &TenantScope,
    collection: Collection,
    window: MonthWindow,
    collaborator: Option<&str>,
) -> Query {
    let query = Query::new(CollectionPath::scoped(scope, collection))
        .where_gte(CREATED_AT, window.start_ms)
        .where_lte(CREATED_AT, window.end_ms);
    match collaborator {
        Some(uid) => query.where_eq("criadoPor", uid),
        None => query,
    }
}

/// Card mensal ao vivo: contagem do mês atual contra a do mês anterior.
///
/// O valor fica `None` até as duas janelas entregarem o primeiro snapshot.
/// Na virada do mês as duas consultas são reabertas sobre as novas janelas.
/// Quando qualquer uma das consultas termina a visão fecha e o canal é
/// encerrado; `close()` ou drop abortam tudo e nada mais é entregue.
pub struct MonthlyCountView {
    rx: watch::Receiver<Option<MonthlySummary>>,
    task: Option<JoinHandle<()>>,
}

impl MonthlyCountView {
    pub fn start(
        store: Arc<dyn DocumentStore>,
        scope: Option<&TenantScope>,
        collection: Collection,
        collaborator: Option<&str>,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let (tx, rx) = watch::channel(None);

        let Some(scope) = scope else {
            // Sem escopo não há o que observar: a visão já nasce fechada
            return Self { rx, task: None };
        };

        let source = WindowSource {
            store,
            scope: scope.clone(),
            collection,
            collaborator: collaborator.map(str::to_owned),
        };
        let task = tokio::spawn(combine(source, now, tx));

        Self {
            rx,
            task: Some(task),
        }
    }

    pub fn latest(&self) -> Option<MonthlySummary> {
        *self.rx.borrow()
    }

    /// Espera o próximo resumo calculado. `None` quando a visão fechou.
    pub async fn changed(&mut self) -> Option<MonthlySummary> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(summary) = *self.rx.borrow_and_update() {
                return Some(summary);
            }
        }
    }

    /// O resumo atual, esperando o primeiro se ainda não houver.
    pub async fn first(&mut self) -> Option<MonthlySummary> {
        if let Some(summary) = *self.rx.borrow_and_update() {
            return Some(summary);
        }
        self.changed().await
    }

    pub fn close(self) {}
}

impl Drop for MonthlyCountView {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

struct WindowSource {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    collection: Collection,
    collaborator: Option<String>,
}

impl WindowSource {
    fn subscribe(&self, window: MonthWindow) -> Subscription {
        live::subscribe(
            self.store.clone(),
            window_query(&self.scope, self.collection, window, self.collaborator.as_deref()),
        )
    }
}

async fn combine(
    source: WindowSource,
    mut now: DateTime<FixedOffset>,
    tx: watch::Sender<Option<MonthlySummary>>,
) {
    // `now` é o relógio de parede no início; o tokio marca quando virar o mês
    let mut clock = Instant::now();

    loop {
        let Some((current_window, previous_window)) =
            month_window(now, 0).zip(month_window(now, 1))
        else {
            tracing::warn!(%now, "Mês fora do calendário, fechando visão mensal");
            return;
        };

        tracing::debug!(
            scope = %source.scope,
            collection = source.collection.as_str(),
            ?current_window,
            ?previous_window,
            "Abrindo janelas mensais"
        );

        let mut current = source.subscribe(current_window);
        let mut previous = source.subscribe(previous_window);
        let mut soma_this_month: Option<usize> = None;
        let mut soma_last_month: Option<usize> = None;

        let next_month_ms = current_window.end_ms + 1;
        let until_rollover = Duration::from_millis(
            u64::try_from(next_month_ms - now.timestamp_millis()).unwrap_or_default(),
        );
        let rollover = tokio::time::sleep_until(clock + until_rollover);
        tokio::pin!(rollover);

        loop {
            tokio::select! {
                _ = tx.closed() => return,
                _ = &mut rollover => break,
                snapshot = current.next_snapshot() => match snapshot {
                    Some(docs) => soma_this_month = Some(docs.len()),
                    None => {
                        tracing::warn!("Janela do mês atual terminou, fechando visão mensal");
                        return;
                    }
                },
                snapshot = previous.next_snapshot() => match snapshot {
                    Some(docs) => soma_last_month = Some(docs.len()),
                    None => {
                        tracing::warn!("Janela do mês anterior terminou, fechando visão mensal");
                        return;
                    }
                },
            }

            if let (Some(cur), Some(prev)) = (soma_this_month, soma_last_month) {
                let summary = MonthlySummary::new(cur, prev);
                tx.send_if_modified(|value| {
                    if *value == Some(summary) {
                        false
                    } else {
                        *value = Some(summary);
                        true
                    }
                });
            }
        }

        // Virou o mês: o último resumo continua valendo até as novas janelas responderem
        clock += until_rollover;
        let Some(next) = DateTime::from_timestamp_millis(next_month_ms) else {
            return;
        };
        now = next.with_timezone(now.offset());
        tracing::info!(collection = source.collection.as_str(), "Virada de mês na visão mensal");
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DocumentStore>,
    offset: FixedOffset,
}

impl DashboardService {
    /// `offset` define onde começam e terminam os meses.
    pub fn new(store: Arc<dyn DocumentStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn watch_monthly(
        &self,
        tenant: Option<&TenantContext>,
        collection: Collection,
        collaborator: Option<&str>,
    ) -> MonthlyCountView {
        // Quem só enxerga as próprias operações também só conta as próprias
        let collaborator = match tenant {
            Some(t)
                if collection == Collection::Operacoes
                    && !t.actor.can_manage_others_operations() =>
            {
                Some(t.uid())
            }
            _ => collaborator,
        };
        MonthlyCountView::start(
            self.store.clone(),
            tenant.map(|t| &t.scope),
            collection,
            collaborator,
            self.now(),
        )
    }

    /// Resumo de uma vez só: abre a visão, pega o primeiro valor e fecha.
    pub async fn monthly_summary(
        &self,
        tenant: Option<&TenantContext>,
        collection: Collection,
        collaborator: Option<&str>,
    ) -> Result<Option<MonthlySummary>, AppError> {
        if tenant.is_none() {
            return Ok(None);
        }
        let mut view = self.watch_monthly(tenant, collection, collaborator);
        let summary = view
            .first()
            .await
            .ok_or_else(|| anyhow::anyhow!("Visão mensal de {} fechou sem resultado", collection.as_str()))?;
        view.close();
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use tokio::time::timeout;

    use super::*;
    use crate::db::{CustomerRepository, DocumentStore};
    use crate::services::testing::{customer_form, owner, Fixture};

    fn brasilia() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        brasilia().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    async fn customer_at(store: &Arc<dyn DocumentStore>, scope: &TenantScope, when: DateTime<FixedOffset>) {
        CustomerRepository::new(store.clone())
            .create(scope, &customer_form("Ana"), "dono-1", when.with_timezone(&Utc))
            .await
            .unwrap();
    }

    #[test]
    fn january_previous_window_is_december_of_last_year() {
        let now = at(2026, 1, 15, 12, 0);

        let current = month_window(now, 0).unwrap();
        assert_eq!(current.start_ms, at(2026, 1, 1, 0, 0).timestamp_millis());
        assert_eq!(current.end_ms, at(2026, 2, 1, 0, 0).timestamp_millis() - 1);

        let previous = month_window(now, 1).unwrap();
        assert_eq!(previous.start_ms, at(2025, 12, 1, 0, 0).timestamp_millis());
        assert_eq!(previous.end_ms, current.start_ms - 1);
    }

    #[test]
    fn december_window_ends_at_new_year() {
        let window = month_window(at(2025, 12, 31, 23, 59), 0).unwrap();
        assert_eq!(window.end_ms, at(2026, 1, 1, 0, 0).timestamp_millis() - 1);
    }

    #[tokio::test]
    async fn counts_windows_in_local_time_and_reacts_to_inserts() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");

        // 00:30 de 1º/jan em Brasília já é janeiro; 23:30 de 31/dez ainda é dezembro
        customer_at(&fx.store, &tenant.scope, at(2026, 1, 1, 0, 30)).await;
        customer_at(&fx.store, &tenant.scope, at(2026, 1, 10, 9, 0)).await;
        customer_at(&fx.store, &tenant.scope, at(2025, 12, 31, 23, 30)).await;
        customer_at(&fx.store, &tenant.scope, at(2025, 11, 20, 9, 0)).await;

        let mut view = MonthlyCountView::start(
            fx.store.clone(),
            Some(&tenant.scope),
            Collection::Clientes,
            None,
            at(2026, 1, 15, 12, 0),
        );
        let first = timeout(Duration::from_secs(2), view.first()).await.unwrap().unwrap();
        assert_eq!(first, MonthlySummary::new(2, 1));
        assert_eq!(first.diferenca_percentual, 100);

        customer_at(&fx.store, &tenant.scope, at(2026, 1, 15, 11, 0)).await;
        let next = timeout(Duration::from_secs(2), view.changed()).await.unwrap().unwrap();
        assert_eq!(next.soma_this_month, 3);
        assert_eq!(next.diferenca_percentual, 200);
        assert_eq!(view.latest(), Some(next));
    }

    #[tokio::test]
    async fn previous_month_insert_and_delete_update_the_card() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let repo = CustomerRepository::new(fx.store.clone());
        customer_at(&fx.store, &tenant.scope, at(2026, 1, 10, 9, 0)).await;
        customer_at(&fx.store, &tenant.scope, at(2026, 1, 11, 9, 0)).await;
        customer_at(&fx.store, &tenant.scope, at(2025, 12, 3, 9, 0)).await;

        let mut view = MonthlyCountView::start(
            fx.store.clone(),
            Some(&tenant.scope),
            Collection::Clientes,
            None,
            at(2026, 1, 15, 12, 0),
        );
        let first = timeout(Duration::from_secs(2), view.first()).await.unwrap().unwrap();
        assert_eq!(first, MonthlySummary::new(2, 1));
        assert_eq!(first.diferenca_percentual, 100);

        let dezembro = repo
            .create(&tenant.scope, &customer_form("Bia"), "dono-1", at(2025, 12, 20, 9, 0).with_timezone(&Utc))
            .await
            .unwrap();
        let inserted = timeout(Duration::from_secs(2), view.changed()).await.unwrap().unwrap();
        assert_eq!(inserted.soma_this_month, 2);
        assert_eq!(inserted.soma_last_month, 2);
        assert_eq!(inserted.diferenca_percentual, 0);

        assert!(repo.delete(&tenant.scope, &dezembro.id).await.unwrap());
        let deleted = timeout(Duration::from_secs(2), view.changed()).await.unwrap().unwrap();
        assert_eq!(deleted, first);
        assert_eq!(deleted.soma_last_month, 1);
        assert_eq!(deleted.diferenca_percentual, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn windows_move_forward_when_the_month_turns() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        customer_at(&fx.store, &tenant.scope, at(2025, 12, 5, 9, 0)).await;
        customer_at(&fx.store, &tenant.scope, at(2026, 1, 10, 9, 0)).await;
        customer_at(&fx.store, &tenant.scope, at(2026, 1, 20, 9, 0)).await;
        customer_at(&fx.store, &tenant.scope, at(2026, 2, 1, 0, 10)).await;

        // Um minuto antes da meia-noite de 31/jan em Brasília
        let mut view = MonthlyCountView::start(
            fx.store.clone(),
            Some(&tenant.scope),
            Collection::Clientes,
            None,
            at(2026, 1, 31, 23, 59),
        );
        let janeiro = timeout(Duration::from_secs(30), view.first()).await.unwrap().unwrap();
        assert_eq!(janeiro, MonthlySummary::new(2, 1));

        let fevereiro = timeout(Duration::from_secs(120), view.changed()).await.unwrap().unwrap();
        assert_eq!(fevereiro, MonthlySummary::new(1, 2));
        assert_eq!(fevereiro.diferenca_percentual, -50);
    }

    #[tokio::test]
    async fn collaborator_filter_counts_only_their_records() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let repo = CustomerRepository::new(fx.store.clone());
        let jan = at(2026, 1, 5, 10, 0).with_timezone(&Utc);
        repo.create(&tenant.scope, &customer_form("A"), "colab-1", jan).await.unwrap();
        repo.create(&tenant.scope, &customer_form("B"), "dono-1", jan).await.unwrap();

        let mut view = MonthlyCountView::start(
            fx.store.clone(),
            Some(&tenant.scope),
            Collection::Clientes,
            Some("colab-1"),
            at(2026, 1, 15, 12, 0),
        );
        let summary = timeout(Duration::from_secs(2), view.first()).await.unwrap().unwrap();
        assert_eq!(summary.soma_this_month, 1);
        assert_eq!(summary.soma_last_month, 0);
        assert_eq!(summary.diferenca_percentual, 0);
    }

    #[tokio::test]
    async fn view_without_scope_is_closed() {
        let fx = Fixture::new();
        let mut view = MonthlyCountView::start(
            fx.store.clone(),
            None,
            Collection::Operacoes,
            None,
            at(2026, 1, 15, 12, 0),
        );
        assert_eq!(view.latest(), None);
        assert_eq!(view.changed().await, None);
        assert_eq!(fx.dashboard.monthly_summary(None, Collection::Operacoes, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn closed_view_stops_counting() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let mut view = fx.dashboard.watch_monthly(Some(&tenant), Collection::Clientes, None);
        let first = timeout(Duration::from_secs(2), view.first()).await.unwrap().unwrap();
        assert_eq!(first.soma_this_month, 0);

        let mut rx = view.rx.clone();
        view.close();
        tokio::task::yield_now().await;

        fx.customers.create(Some(&tenant), customer_form("Ana")).await.unwrap();
        let result = timeout(Duration::from_secs(2), rx.changed()).await.unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn restricted_collaborator_counts_only_own_operations() {
        use crate::models::user::Permissoes;
        use crate::services::testing::{collaborator, operation_form};

        let fx = Fixture::new();
        let gerente = owner("gerente-1");
        let restrito = collaborator("colab-1", "gerente-1", Permissoes::default());
        let ana = fx.customers.create(Some(&gerente), customer_form("Ana")).await.unwrap().unwrap();
        fx.operations.create(Some(&gerente), operation_form(&ana.id)).await.unwrap();
        fx.operations.create(Some(&restrito), operation_form(&ana.id)).await.unwrap();

        let do_gerente = fx
            .dashboard
            .monthly_summary(Some(&gerente), Collection::Operacoes, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(do_gerente.soma_this_month, 2);

        let do_colaborador = fx
            .dashboard
            .monthly_summary(Some(&restrito), Collection::Operacoes, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(do_colaborador.soma_this_month, 1);
    }

    #[tokio::test]
    async fn one_shot_summary_sees_records_created_now() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        fx.customers.create(Some(&tenant), customer_form("Ana")).await.unwrap();
        fx.customers.create(Some(&tenant), customer_form("Bia")).await.unwrap();

        let summary = fx
            .dashboard
            .monthly_summary(Some(&tenant), Collection::Clientes, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.soma_this_month, 2);
        assert_eq!(summary.soma_last_month, 0);
    }
}
