// src/config.rs

pub mod settings;

use std::{sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    config::settings::{AppConfig, StoreBackend},
    db::{
        CustomerRepository, DocumentStore, MemoryStore, OperationRepository, PgDocumentStore,
        UserRepository,
    },
    services::{
        auth::AuthService, customer_service::CustomerService,
        dashboard_service::DashboardService, notification::NotificationHub,
        operation_service::OperationService, user_service::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub notifier: NotificationHub,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub customer_service: CustomerService,
    pub operation_service: OperationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = AppConfig::from_env()?;

        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgDocumentStore::connect(db_pool).await?)
            }
        };

        Ok(Self::with_store(config, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let notifier = NotificationHub::new();

        let customer_repo = CustomerRepository::new(store.clone());
        let operation_repo = OperationRepository::new(store.clone());
        let user_repo = UserRepository::new(store.clone());

        let user_service = UserService::new(
            user_repo,
            customer_repo.clone(),
            operation_repo.clone(),
            notifier.clone(),
        );
        let auth_service = AuthService::new(user_service.clone(), config.jwt_secret.clone());
        let customer_service =
            CustomerService::new(customer_repo.clone(), operation_repo.clone(), notifier.clone());
        let operation_service = OperationService::new(operation_repo, customer_repo, notifier.clone());
        let dashboard_service = DashboardService::new(store, config.dashboard_offset);

        Self {
            config,
            notifier,
            auth_service,
            user_service,
            customer_service,
            operation_service,
            dashboard_service,
        }
    }
}
