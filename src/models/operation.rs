// src/models/operation.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::validation::validate_positive;
use crate::models::auth::Actor;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusDaOperacao {
    Concluido,
    Processando,
    Pendente,
    Falha,
}

impl StatusDaOperacao {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusDaOperacao::Concluido => "concluido",
            StatusDaOperacao::Processando => "processando",
            StatusDaOperacao::Pendente => "pendente",
            StatusDaOperacao::Falha => "falha",
        }
    }
}

// --- Dados do formulário ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DadosDaOperacao {
    #[validate(length(min = 1, message = "required"))]
    pub cliente_id: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Consignado INSS")]
    pub tipo_da_operacao: String,

    #[schema(example = "pendente")]
    pub status_da_operacao: StatusDaOperacao,

    #[schema(example = "2026-03-10")]
    pub data_da_operacao: NaiveDate,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Banco do Brasil")]
    pub banco: String,

    /// Valor liberado ao cliente
    #[validate(custom(function = "validate_positive"))]
    #[schema(value_type = f64, example = 15000.0)]
    pub valor_liberado: Decimal,

    /// Comissão em porcentagem
    #[validate(custom(function = "validate_positive"))]
    #[schema(value_type = f64, example = 2.5)]
    pub comissao: Decimal,
}

impl DadosDaOperacao {
    pub fn valor_recebido(&self) -> Decimal {
        calcular_valor_recebido(self.valor_liberado, self.comissao)
    }
}

/// valorLiberado * comissao / 100
pub fn calcular_valor_recebido(valor_liberado: Decimal, comissao: Decimal) -> Decimal {
    valor_liberado * comissao / Decimal::ONE_HUNDRED
}

// --- Operação (O Documento salvo) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,

    #[serde(flatten)]
    pub dados: DadosDaOperacao,

    /// Nome do cliente copiado no momento da gravação
    #[schema(example = "Ana Pereira")]
    pub cliente: String,

    #[schema(value_type = f64, example = 375.0)]
    pub valor_recebido: Decimal,

    pub criado_por: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64, example = 1767225600000i64)]
    pub created_at: DateTime<Utc>,
}

impl Operation {
    // Colaborador sem `gerenciarOperacoesDeOutros` só enxerga o que criou
    pub fn visible_to(&self, actor: &Actor) -> bool {
        actor.can_manage_others_operations() || self.criado_por == actor.uid
    }
}

// --- Filtros da tabela ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OperationFilter {
    /// Parte do nome do cliente (sem diferenciar maiúsculas)
    pub cliente: Option<String>,
    pub status: Option<StatusDaOperacao>,
    pub tipo: Option<String>,
    /// uid de quem criou
    pub criado_por: Option<String>,
}

impl OperationFilter {
    pub fn matches(&self, op: &Operation) -> bool {
        if let Some(cliente) = self.cliente.as_deref().filter(|c| !c.is_empty()) {
            if !op.cliente.to_lowercase().contains(&cliente.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if op.dados.status_da_operacao != status {
                return false;
            }
        }
        if let Some(tipo) = self.tipo.as_deref().filter(|t| !t.is_empty()) {
            if op.dados.tipo_da_operacao != tipo {
                return false;
            }
        }
        if let Some(criado_por) = self.criado_por.as_deref().filter(|c| !c.is_empty()) {
            if op.criado_por != criado_por {
                return false;
            }
        }
        true
    }
}
