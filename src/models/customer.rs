// src/models/customer.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_cpf;

// --- DADOS DO FORMULÁRIO ---
// Usado tanto no cadastro quanto na edição (a edição sobrescreve todos os campos)

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DadosDoCliente {
    // Dados pessoais
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana Pereira")]
    pub nome: String,

    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "529.982.247-25")]
    pub cpf: String,

    pub rg: Option<String>,
    pub data_de_emissao: Option<NaiveDate>,
    pub local_de_emissao: Option<String>,

    #[schema(example = "1980-04-12")]
    pub data_de_nascimento: NaiveDate,

    pub sexo: Option<String>,
    pub estado_civil: Option<String>,
    pub naturalidade: Option<String>,
    pub nome_da_mae: Option<String>,

    // Contato
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[schema(example = "(11) 98765-4321")]
    pub telefone: Option<String>,

    // Endereço
    pub cep: Option<String>,
    pub rua: Option<String>,
    pub numero_da_rua: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    #[validate(length(equal = 2, message = "invalid_uf"))]
    #[schema(example = "SP")]
    pub estado: Option<String>,

    // Dados bancários
    pub banco: Option<String>,
    pub agencia: Option<String>,
    pub numero_da_conta: Option<String>,
    pub digito_da_conta: Option<String>,
    pub chave_pix: Option<String>,
}

// --- CLIENTE (O Documento salvo) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,

    #[serde(flatten)]
    pub dados: DadosDoCliente,

    /// uid de quem cadastrou
    pub criado_por: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64, example = 1767225600000i64)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDeletion {
    pub operacoes_removidas: usize,
    pub falhas: usize,
}
