// src/services/operation_service.rs

use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OperationRepository},
    models::{
        operation::{DadosDaOperacao, Operation, OperationFilter},
        tenancy::TenantContext,
    },
    services::notification::NotificationHub,
};

#[derive(Clone)]
pub struct OperationService {
    repo: OperationRepository,
    customers: CustomerRepository,
    notifier: NotificationHub,
}

impl OperationService {
    pub fn new(
        repo: OperationRepository,
        customers: CustomerRepository,
        notifier: NotificationHub,
    ) -> Self {
        Self {
            repo,
            customers,
            notifier,
        }
    }

    async fn cliente_nome(&self, tenant: &TenantContext, cliente_id: &str) -> Result<String, AppError> {
        self.customers
            .find_by_id(&tenant.scope, cliente_id)
            .await?
            .map(|c| c.dados.nome)
            .ok_or_else(|| AppError::not_found("Cliente"))
    }

    // Busca a operação garantindo que o ator pode mexer nela
    async fn find_editable(&self, tenant: &TenantContext, id: &str) -> Result<Operation, AppError> {
        let op = self
            .repo
            .find_by_id(&tenant.scope, id)
            .await?
            .ok_or_else(|| AppError::not_found("Operação"))?;
        if !op.visible_to(&tenant.actor) {
            return Err(AppError::Forbidden(
                "Você não pode alterar operações de outros colaboradores.".into(),
            ));
        }
        Ok(op)
    }

    pub async fn create(
        &self,
        tenant: Option<&TenantContext>,
        dados: DadosDaOperacao,
    ) -> Result<Option<Operation>, AppError> {
        let Some(tenant) = tenant else {
            tracing::debug!("Cadastro de operação ignorado: sem usuário autenticado");
            return Ok(None);
        };

        let result = async {
            dados.validate()?;
            let cliente = self.cliente_nome(tenant, &dados.cliente_id).await?;
            self.repo
                .create(&tenant.scope, &dados, &cliente, tenant.uid(), Utc::now())
                .await
        }
        .await;

        let op = self.notifier.report(
            tenant.uid(),
            result,
            "Operação cadastrada com sucesso!",
            "Algo deu errado, tente novamente!",
        )?;
        tracing::info!(scope = %tenant.scope, id = %op.id, valor_recebido = %op.valor_recebido, "Operação cadastrada");
        Ok(Some(op))
    }

    /// Lista para a tabela: aplica visibilidade e filtros, mais recentes primeiro.
    pub async fn list(
        &self,
        tenant: Option<&TenantContext>,
        filter: &OperationFilter,
    ) -> Result<Vec<Operation>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(Vec::new());
        };

        let mut operations: Vec<Operation> = self
            .repo
            .list(&tenant.scope)
            .await
            .inspect_err(|e| {
                tracing::error!(scope = %tenant.scope, "🔥 Falha ao listar operações: {:?}", e)
            })?
            .into_iter()
            .filter(|op| op.visible_to(&tenant.actor) && filter.matches(op))
            .collect();

        operations.sort_by(|a, b| {
            b.dados
                .data_da_operacao
                .cmp(&a.dados.data_da_operacao)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(operations)
    }

    pub async fn get(
        &self,
        tenant: Option<&TenantContext>,
        id: &str,
    ) -> Result<Option<Operation>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };
        let op = self.repo.find_by_id(&tenant.scope, id).await?;
        Ok(op.filter(|op| op.visible_to(&tenant.actor)))
    }

    pub async fn update(
        &self,
        tenant: Option<&TenantContext>,
        id: &str,
        dados: DadosDaOperacao,
    ) -> Result<Option<Operation>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };

        let result = async {
            dados.validate()?;
            self.find_editable(tenant, id).await?;
            let cliente = self.cliente_nome(tenant, &dados.cliente_id).await?;
            self.repo
                .update(&tenant.scope, id, &dados, &cliente)
                .await?
                .ok_or_else(|| AppError::not_found("Operação"))
        }
        .await;

        self.notifier
            .report(
                tenant.uid(),
                result,
                "Operação atualizada com sucesso!",
                "Algo deu errado, tente novamente!",
            )
            .map(Some)
    }

    pub async fn delete(&self, tenant: Option<&TenantContext>, id: &str) -> Result<(), AppError> {
        let Some(tenant) = tenant else {
            return Ok(());
        };

        let result = async {
            self.find_editable(tenant, id).await?;
            if !self.repo.delete(&tenant.scope, id).await? {
                return Err(AppError::not_found("Operação"));
            }
            Ok::<(), AppError>(())
        }
        .await;

        self.notifier.report(
            tenant.uid(),
            result,
            "Operação excluída com sucesso!",
            "Erro ao excluir documento.",
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::common::error::AppError;
    use crate::models::operation::{OperationFilter, StatusDaOperacao};
    use crate::models::user::Permissoes;
    use crate::services::testing::{collaborator, customer_form, operation_form, owner, Fixture};

    #[tokio::test]
    async fn create_computes_amount_and_copies_customer_name() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let ana = fx.customers.create(Some(&tenant), customer_form("Ana Pereira")).await.unwrap().unwrap();

        let mut form = operation_form(&ana.id);
        form.valor_liberado = Decimal::from(15_000);
        form.comissao = Decimal::new(25, 1);
        let op = fx.operations.create(Some(&tenant), form).await.unwrap().unwrap();

        assert_eq!(op.valor_recebido, Decimal::from(375));
        assert_eq!(op.cliente, "Ana Pereira");
        assert_eq!(op.criado_por, "dono-1");

        let stored = fx.operations.get(Some(&tenant), &op.id).await.unwrap().unwrap();
        assert_eq!(stored.id, op.id);
        assert_eq!(stored.valor_recebido, Decimal::from(375));
    }

    #[tokio::test]
    async fn create_rejects_unknown_customer_and_zero_commission() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let result = fx.operations.create(Some(&tenant), operation_form("fantasma")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let ana = fx.customers.create(Some(&tenant), customer_form("Ana")).await.unwrap().unwrap();
        let mut form = operation_form(&ana.id);
        form.comissao = Decimal::ZERO;
        let result = fx.operations.create(Some(&tenant), form).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(fx.operations.list(Some(&tenant), &OperationFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_recomputes_received_amount() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let ana = fx.customers.create(Some(&tenant), customer_form("Ana")).await.unwrap().unwrap();
        let op = fx.operations.create(Some(&tenant), operation_form(&ana.id)).await.unwrap().unwrap();

        let mut form = operation_form(&ana.id);
        form.valor_liberado = Decimal::from(2_000);
        form.comissao = Decimal::from(10);
        form.status_da_operacao = StatusDaOperacao::Concluido;
        let updated = fx.operations.update(Some(&tenant), &op.id, form).await.unwrap().unwrap();

        assert_eq!(updated.valor_recebido, Decimal::from(200));
        assert_eq!(updated.dados.status_da_operacao, StatusDaOperacao::Concluido);
        assert_eq!(updated.created_at, op.created_at);
    }

    #[tokio::test]
    async fn list_filters_and_sorts_newest_first() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let ana = fx.customers.create(Some(&tenant), customer_form("Ana")).await.unwrap().unwrap();
        let bia = fx.customers.create(Some(&tenant), customer_form("Bia")).await.unwrap().unwrap();

        let mut antiga = operation_form(&ana.id);
        antiga.data_da_operacao = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut nova = operation_form(&ana.id);
        nova.data_da_operacao = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        let mut outra = operation_form(&bia.id);
        outra.status_da_operacao = StatusDaOperacao::Falha;
        for form in [antiga, nova, outra] {
            fx.operations.create(Some(&tenant), form).await.unwrap();
        }

        let filter = OperationFilter {
            cliente: Some("ana".into()),
            ..Default::default()
        };
        let ops = fx.operations.list(Some(&tenant), &filter).await.unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops[0].dados.data_da_operacao > ops[1].dados.data_da_operacao);

        let filter = OperationFilter {
            status: Some(StatusDaOperacao::Falha),
            ..Default::default()
        };
        let ops = fx.operations.list(Some(&tenant), &filter).await.unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].cliente, "Bia");
    }

    #[tokio::test]
    async fn collaborator_without_permission_only_sees_own_operations() {
        let fx = Fixture::new();
        let gerente = owner("gerente-1");
        let restrito = collaborator("colab-1", "gerente-1", Permissoes::default());
        let supervisor = collaborator(
            "colab-2",
            "gerente-1",
            Permissoes {
                gerenciar_operacoes_de_outros: true,
                gerenciar_tipo_de_operacoes: false,
            },
        );

        let ana = fx.customers.create(Some(&gerente), customer_form("Ana")).await.unwrap().unwrap();
        let do_gerente = fx.operations.create(Some(&gerente), operation_form(&ana.id)).await.unwrap().unwrap();
        fx.operations.create(Some(&restrito), operation_form(&ana.id)).await.unwrap();

        let vistas = fx.operations.list(Some(&restrito), &OperationFilter::default()).await.unwrap();
        assert_eq!(vistas.len(), 1);
        assert_eq!(vistas[0].criado_por, "colab-1");
        assert!(fx.operations.get(Some(&restrito), &do_gerente.id).await.unwrap().is_none());

        let result = fx.operations.delete(Some(&restrito), &do_gerente.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let todas = fx.operations.list(Some(&supervisor), &OperationFilter::default()).await.unwrap();
        assert_eq!(todas.len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_operation_and_no_tenant_is_no_op() {
        let fx = Fixture::new();
        let tenant = owner("dono-1");
        let ana = fx.customers.create(Some(&tenant), customer_form("Ana")).await.unwrap().unwrap();
        let op = fx.operations.create(Some(&tenant), operation_form(&ana.id)).await.unwrap().unwrap();

        fx.operations.delete(None, &op.id).await.unwrap();
        assert!(fx.operations.get(Some(&tenant), &op.id).await.unwrap().is_some());

        fx.operations.delete(Some(&tenant), &op.id).await.unwrap();
        assert!(fx.operations.get(Some(&tenant), &op.id).await.unwrap().is_none());
        assert!(matches!(
            fx.operations.delete(Some(&tenant), &op.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
