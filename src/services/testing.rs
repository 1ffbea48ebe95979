// src/services/testing.rs
// Montagem dos serviços sobre o MemoryStore para os testes

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    db::{CustomerRepository, DocumentStore, MemoryStore, OperationRepository, UserRepository},
    models::{
        auth::Actor,
        customer::DadosDoCliente,
        operation::{DadosDaOperacao, StatusDaOperacao},
        tenancy::TenantContext,
        user::Permissoes,
    },
    services::{
        customer_service::CustomerService, dashboard_service::DashboardService,
        notification::NotificationHub, operation_service::OperationService,
        user_service::UserService,
    },
};

pub struct Fixture {
    pub store: Arc<dyn DocumentStore>,
    pub customers: CustomerService,
    pub operations: OperationService,
    pub users: UserService,
    pub dashboard: DashboardService,
}

impl Fixture {
    pub fn new() -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let notifier = NotificationHub::new();
        let customer_repo = CustomerRepository::new(store.clone());
        let operation_repo = OperationRepository::new(store.clone());

        Self {
            customers: CustomerService::new(
                customer_repo.clone(),
                operation_repo.clone(),
                notifier.clone(),
            ),
            users: UserService::new(
                UserRepository::new(store.clone()),
                customer_repo.clone(),
                operation_repo.clone(),
                notifier.clone(),
            ),
            operations: OperationService::new(operation_repo, customer_repo, notifier),
            dashboard: DashboardService::new(store.clone(), FixedOffset::west_opt(3 * 3600).unwrap()),
            store,
        }
    }
}

pub fn owner(uid: &str) -> TenantContext {
    TenantContext::from_actor(Some(Actor::owner(uid))).unwrap()
}

pub fn collaborator(uid: &str, gerente: &str, permissoes: Permissoes) -> TenantContext {
    TenantContext::from_actor(Some(Actor::collaborator(uid, gerente, permissoes))).unwrap()
}

pub fn customer_form(nome: &str) -> DadosDoCliente {
    DadosDoCliente {
        nome: nome.to_string(),
        cpf: "529.982.247-25".into(),
        rg: None,
        data_de_emissao: None,
        local_de_emissao: None,
        data_de_nascimento: NaiveDate::from_ymd_opt(1980, 4, 12).unwrap(),
        sexo: None,
        estado_civil: None,
        naturalidade: None,
        nome_da_mae: None,
        email: None,
        telefone: Some("(11) 98765-4321".into()),
        cep: None,
        rua: None,
        numero_da_rua: None,
        complemento: None,
        bairro: None,
        cidade: Some("São Paulo".into()),
        estado: Some("SP".into()),
        banco: None,
        agencia: None,
        numero_da_conta: None,
        digito_da_conta: None,
        chave_pix: None,
    }
}

pub fn operation_form(cliente_id: &str) -> DadosDaOperacao {
    DadosDaOperacao {
        cliente_id: cliente_id.to_string(),
        tipo_da_operacao: "Consignado INSS".into(),
        status_da_operacao: StatusDaOperacao::Pendente,
        data_da_operacao: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        banco: "Banco do Brasil".into(),
        valor_liberado: Decimal::from(1_000),
        comissao: Decimal::from(5),
    }
}
