// src/config/settings.rs

use std::{env, str::FromStr};

use anyhow::Context;
use chrono::FixedOffset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("STORE_BACKEND inválido: '{}' (use postgres ou memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub db_max_connections: u32,
    /// Fuso em que os meses do painel começam e terminam (Brasília por padrão)
    pub dashboard_offset: FixedOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do `env` para dar para testar sem mexer no ambiente do processo
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let store_backend = match get("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida quando STORE_BACKEND=postgres");
        }

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(value) => value.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };

        let offset_minutes: i32 = match get("DASHBOARD_UTC_OFFSET_MINUTES") {
            Some(value) => value
                .parse()
                .context("DASHBOARD_UTC_OFFSET_MINUTES deve ser um número de minutos")?,
            None => -180,
        };
        let dashboard_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("Fuso inválido: {} minutos", offset_minutes))?;

        Ok(Self {
            jwt_secret,
            store_backend,
            database_url,
            bind_addr,
            db_max_connections,
            dashboard_offset,
        })
    }
}
