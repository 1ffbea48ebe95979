// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Card "Clientes (mês)" / "Operações (mês)"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub soma_this_month: usize,
    pub soma_last_month: usize,
    /// Variação percentual arredondada; 0 quando o mês anterior está vazio
    pub diferenca_percentual: i64,
}

impl MonthlySummary {
    pub fn new(current: usize, previous: usize) -> Self {
        Self {
            soma_this_month: current,
            soma_last_month: previous,
            diferenca_percentual: percent_change(current, previous),
        }
    }
}

/// round((atual - anterior) / anterior * 100), com meio arredondando para cima.
/// Sem dados no mês anterior o resultado é 0 em vez de infinito.
pub fn percent_change(current: usize, previous: usize) -> i64 {
    if previous == 0 {
        return 0;
    }
    let ratio = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (ratio + 0.5).floor() as i64
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MonthlyParams {
    /// Restringe a contagem aos registros criados por este colaborador
    pub collaborator_uid: Option<String>,
}
