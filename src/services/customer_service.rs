// src/services/customer_service.rs

use chrono::Utc;
use futures::future::join_all;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OperationRepository},
    models::{
        customer::{Customer, CustomerDeletion, DadosDoCliente},
        tenancy::TenantContext,
    },
    services::notification::NotificationHub,
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    operations: OperationRepository,
    notifier: NotificationHub,
}

impl CustomerService {
    pub fn new(
        repo: CustomerRepository,
        operations: OperationRepository,
        notifier: NotificationHub,
    ) -> Self {
        Self {
            repo,
            operations,
            notifier,
        }
    }

    // Todas as operações abaixo: sem tenant (ninguém logado) não fazem nada.

    pub async fn create(
        &self,
        tenant: Option<&TenantContext>,
        dados: DadosDoCliente,
    ) -> Result<Option<Customer>, AppError> {
        let Some(tenant) = tenant else {
            tracing::debug!("Cadastro de cliente ignorado: sem usuário autenticado");
            return Ok(None);
        };

        let result = match dados.validate() {
            Ok(()) => {
                self.repo
                    .create(&tenant.scope, &dados, tenant.uid(), Utc::now())
                    .await
            }
            Err(e) => Err(e.into()),
        };

        let customer = self.notifier.report(
            tenant.uid(),
            result,
            "Cliente cadastrado com sucesso!",
            "Algo deu errado, tente novamente!",
        )?;
        tracing::info!(scope = %tenant.scope, id = %customer.id, "Cliente cadastrado");
        Ok(Some(customer))
    }

    pub async fn list(&self, tenant: Option<&TenantContext>) -> Result<Vec<Customer>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(Vec::new());
        };
        self.repo.list(&tenant.scope).await.inspect_err(|e| {
            tracing::error!(scope = %tenant.scope, "🔥 Falha ao listar clientes: {:?}", e)
        })
    }

    pub async fn get(
        &self,
        tenant: Option<&TenantContext>,
        id: &str,
    ) -> Result<Option<Customer>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };
        self.repo.find_by_id(&tenant.scope, id).await.inspect_err(|e| {
            tracing::error!(scope = %tenant.scope, id, "🔥 Falha ao buscar cliente: {:?}", e)
        })
    }

    pub async fn update(
        &self,
        tenant: Option<&TenantContext>,
        id: &str,
        dados: DadosDoCliente,
    ) -> Result<Option<Customer>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };

        let result = match dados.validate() {
            Ok(()) => self
                .repo
                .update(&tenant.scope, id, &dados)
                .await
                .and_then(|updated| updated.ok_or_else(|| AppError::not_found("Cliente"))),
            Err(e) => Err(e.into()),
        };

        self.notifier
            .report(
                tenant.uid(),
                result,
                "Cliente atualizado com sucesso!",
                "Algo deu errado, tente novamente!",
            )
            .map(Some)
    }

    /// Apaga o cliente e, com `cascade`, todas as operações dele.
    ///
    /// As operações são apagadas em paralelo e de forma independente: se uma
    /// falhar as outras seguem, e nada é desfeito. Se o cliente tiver alguma
    /// operação que o ator não enxerga, nada é apagado.
    pub async fn delete(
        &self,
        tenant: Option<&TenantContext>,
        id: &str,
        cascade: bool,
    ) -> Result<Option<CustomerDeletion>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };

        let result = self.delete_scoped(tenant, id, cascade).await;
        let success = if cascade {
            "Cliente e operações excluídos com sucesso!"
        } else {
            "Cliente excluído com sucesso!"
        };
        self.notifier
            .report(tenant.uid(), result, success, "Erro ao excluir documento.")
            .map(Some)
    }

    async fn delete_scoped(
        &self,
        tenant: &TenantContext,
        id: &str,
        cascade: bool,
    ) -> Result<CustomerDeletion, AppError> {
        if self.repo.find_by_id(&tenant.scope, id).await?.is_none() {
            return Err(AppError::not_found("Cliente"));
        }

        // A cascata segue a mesma regra da exclusão direta: nada é apagado
        // se o cliente tiver operações que o ator não pode alterar
        let operations = if cascade {
            let operations = self.operations.list_by_cliente(&tenant.scope, id).await?;
            if operations.iter().any(|op| !op.visible_to(&tenant.actor)) {
                return Err(AppError::Forbidden(
                    "Este cliente tem operações de outros colaboradores.".into(),
                ));
            }
            operations
        } else {
            Vec::new()
        };

        if !self.repo.delete(&tenant.scope, id).await? {
            return Err(AppError::not_found("Cliente"));
        }

        let mut outcome = CustomerDeletion {
            operacoes_removidas: 0,
            falhas: 0,
        };
        if !cascade {
            return Ok(outcome);
        }

        let results = join_all(
            operations
                .iter()
                .map(|op| self.operations.delete(&tenant.scope, &op.id)),
        )
        .await;

        for (op, result) in operations.iter().zip(results) {
            match result {
                Ok(true) => outcome.operacoes_removidas += 1,
                Ok(false) => {
                    tracing::debug!(operacao = %op.id, "Operação já não existia na cascata")
                }
                Err(e) => {
                    outcome.falhas += 1;
                    tracing::warn!(operacao = %op.id, "Falha ao excluir operação em cascata: {:?}", e);
                }
            }
        }

        tracing::info!(
            scope = %tenant.scope,
            cliente = id,
            removidas = outcome.operacoes_removidas,
            falhas = outcome.falhas,
            "Cliente excluído com cascata"
        );
        Ok(outcome)
    }
}
