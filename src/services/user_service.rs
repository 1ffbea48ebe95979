// src/services/user_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OperationRepository, UserRepository},
    models::{
        auth::Actor,
        tenancy::TenantContext,
        user::{
            ConviteDeEquipe, NewCollaboratorPayload, TipoDeOperacao, UpdateProfilePayload,
            UserProfile,
        },
    },
    services::notification::NotificationHub,
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    customers: CustomerRepository,
    operations: OperationRepository,
    notifier: NotificationHub,
}

impl UserService {
    pub fn new(
        repo: UserRepository,
        customers: CustomerRepository,
        operations: OperationRepository,
        notifier: NotificationHub,
    ) -> Self {
        Self {
            repo,
            customers,
            operations,
            notifier,
        }
    }

    /// Resolve o ator do uid autenticado: gerente e permissões vêm do perfil.
    pub async fn load_actor(&self, uid: &str) -> Result<Actor, AppError> {
        let profile = self.repo.find_by_id(uid).await?;
        Ok(Actor::from_profile(uid, profile.as_ref()))
    }

    pub async fn me(&self, tenant: Option<&TenantContext>) -> Result<Option<UserProfile>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };
        let profile = self.repo.find_by_id(tenant.uid()).await?;
        Ok(Some(profile.unwrap_or_else(|| UserProfile::empty(tenant.uid()))))
    }

    pub async fn update_me(
        &self,
        tenant: Option<&TenantContext>,
        payload: UpdateProfilePayload,
    ) -> Result<Option<UserProfile>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };
        payload.validate()?;

        let result = async {
            let mut profile = self
                .repo
                .find_by_id(tenant.uid())
                .await?
                .unwrap_or_else(|| UserProfile::empty(tenant.uid()));
            profile.nome = payload.nome;
            profile.avatar = payload.avatar;
            self.repo.save(&profile).await
        }
        .await;

        self.notifier
            .report(
                tenant.uid(),
                result,
                "Perfil atualizado com sucesso!",
                "Algo deu errado, tente novamente!",
            )
            .map(Some)
    }

    // =========================================================================
    //  COLABORADORES
    // =========================================================================

    /// Colaboradores da equipe do escopo (para o filtro "Criado por").
    pub async fn list_collaborators(
        &self,
        tenant: Option<&TenantContext>,
    ) -> Result<Vec<UserProfile>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(Vec::new());
        };
        self.repo.list_by_gerente(tenant.scope.id()).await
    }

    pub async fn add_collaborator(
        &self,
        tenant: Option<&TenantContext>,
        payload: NewCollaboratorPayload,
    ) -> Result<Option<UserProfile>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };
        payload.validate()?;

        if tenant.actor.is_collaborator() {
            return Err(AppError::Forbidden(
                "Apenas o gerente pode cadastrar colaboradores.".into(),
            ));
        }
        if payload.uid == tenant.uid() {
            return Err(AppError::Forbidden(
                "Você não pode ser colaborador de si mesmo.".into(),
            ));
        }

        let result = async {
            let mut profile = self
                .repo
                .find_by_id(&payload.uid)
                .await?
                .unwrap_or_else(|| UserProfile::empty(payload.uid.clone()));

            match profile.gerente_uid.as_deref() {
                // Já é da equipe: só atualiza nome e permissões
                Some(g) if g == tenant.uid() => {
                    profile.nome = payload.nome;
                    profile.permissoes = payload.permissoes;
                }
                Some(_) => {
                    return Err(AppError::Forbidden(
                        "Este usuário já faz parte de outra equipe.".into(),
                    ));
                }
                None => {
                    if !self.repo.list_by_gerente(&payload.uid).await?.is_empty() {
                        return Err(AppError::Forbidden(
                            "Este usuário já gerencia a própria equipe.".into(),
                        ));
                    }
                    profile.convite = Some(ConviteDeEquipe {
                        gerente_uid: tenant.uid().to_string(),
                        nome: payload.nome,
                        permissoes: payload.permissoes,
                    });
                }
            }
            self.repo.save(&profile).await
        }
        .await;

        self.notifier
            .report(
                tenant.uid(),
                result,
                "Colaborador salvo com sucesso!",
                "Algo deu errado, tente novamente!",
            )
            .map(Some)
    }

    /// O convidado aceita o convite com o próprio token.
    pub async fn accept_invite(
        &self,
        tenant: Option<&TenantContext>,
    ) -> Result<Option<UserProfile>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };

        let result = async {
            let mut profile = self
                .repo
                .find_by_id(tenant.uid())
                .await?
                .unwrap_or_else(|| UserProfile::empty(tenant.uid()));
            let Some(convite) = profile.convite.take() else {
                return Err(AppError::not_found("Convite"));
            };

            if tenant.actor.is_collaborator() {
                return Err(AppError::Forbidden(
                    "Você já faz parte de uma equipe.".into(),
                ));
            }
            // Quem já tem dados ou equipe própria perderia o acesso a eles
            if !self.repo.list_by_gerente(tenant.uid()).await?.is_empty() {
                return Err(AppError::Forbidden(
                    "Você já gerencia colaboradores.".into(),
                ));
            }
            if !self.customers.list(&tenant.scope).await?.is_empty()
                || !self.operations.list(&tenant.scope).await?.is_empty()
            {
                return Err(AppError::Forbidden(
                    "Sua conta já tem clientes ou operações cadastrados.".into(),
                ));
            }

            if profile.nome.is_empty() {
                profile.nome = convite.nome;
            }
            profile.gerente_uid = Some(convite.gerente_uid);
            profile.permissoes = convite.permissoes;
            self.repo.save(&profile).await
        }
        .await;

        self.notifier
            .report(
                tenant.uid(),
                result,
                "Convite aceito! Bem-vindo à equipe.",
                "Não foi possível aceitar o convite.",
            )
            .map(Some)
    }

    pub async fn decline_invite(
        &self,
        tenant: Option<&TenantContext>,
    ) -> Result<Option<UserProfile>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };

        let result = async {
            let mut profile = self
                .repo
                .find_by_id(tenant.uid())
                .await?
                .ok_or_else(|| AppError::not_found("Convite"))?;
            if profile.convite.take().is_none() {
                return Err(AppError::not_found("Convite"));
            }
            self.repo.save(&profile).await
        }
        .await;

        self.notifier
            .report(
                tenant.uid(),
                result,
                "Convite recusado.",
                "Algo deu errado, tente novamente!",
            )
            .map(Some)
    }

    // =========================================================================
    //  TIPOS DE OPERAÇÃO (ficam no perfil do dono do escopo)
    // =========================================================================

    async fn scope_owner_profile(&self, tenant: &TenantContext) -> Result<UserProfile, AppError> {
        Ok(self
            .repo
            .find_by_id(tenant.scope.id())
            .await?
            .unwrap_or_else(|| UserProfile::empty(tenant.scope.id())))
    }

    pub async fn list_operation_types(
        &self,
        tenant: Option<&TenantContext>,
    ) -> Result<Vec<TipoDeOperacao>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(Vec::new());
        };
        Ok(self.scope_owner_profile(tenant).await?.tipos_de_operacoes)
    }

    /// Adiciona o tipo; se já existe um com o mesmo nome, só troca a cor.
    pub async fn add_operation_type(
        &self,
        tenant: Option<&TenantContext>,
        tipo: TipoDeOperacao,
    ) -> Result<Vec<TipoDeOperacao>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(Vec::new());
        };
        tipo.validate()?;
        Self::ensure_can_manage_types(tenant)?;

        let result = async {
            let mut profile = self.scope_owner_profile(tenant).await?;
            match profile.tipos_de_operacoes.iter_mut().find(|t| t.name == tipo.name) {
                Some(existing) => existing.color = tipo.color,
                None => profile.tipos_de_operacoes.push(tipo),
            }
            Ok::<_, AppError>(self.repo.save(&profile).await?.tipos_de_operacoes)
        }
        .await;

        self.notifier.report(
            tenant.uid(),
            result,
            "Tipo de operação salvo!",
            "Algo deu errado, tente novamente!",
        )
    }

    pub async fn remove_operation_type(
        &self,
        tenant: Option<&TenantContext>,
        name: &str,
    ) -> Result<Vec<TipoDeOperacao>, AppError> {
        let Some(tenant) = tenant else {
            return Ok(Vec::new());
        };
        Self::ensure_can_manage_types(tenant)?;

        let result = async {
            let mut profile = self.scope_owner_profile(tenant).await?;
            let before = profile.tipos_de_operacoes.len();
            profile.tipos_de_operacoes.retain(|t| t.name != name);
            if profile.tipos_de_operacoes.len() == before {
                return Err(AppError::not_found("Tipo de operação"));
            }
            Ok::<_, AppError>(self.repo.save(&profile).await?.tipos_de_operacoes)
        }
        .await;

        self.notifier.report(
            tenant.uid(),
            result,
            "Tipo de operação removido!",
            "Algo deu errado, tente novamente!",
        )
    }

    fn ensure_can_manage_types(tenant: &TenantContext) -> Result<(), AppError> {
        if tenant.actor.can_manage_operation_types() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Você não tem permissão para gerenciar tipos de operação.".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::common::error::AppError;
    use crate::models::user::{NewCollaboratorPayload, Permissoes, TipoDeOperacao, UpdateProfilePayload};
    use crate::services::testing::{collaborator, customer_form, owner, Fixture};

    fn convidar(uid: &str, nome: &str, permissoes: Permissoes) -> NewCollaboratorPayload {
        NewCollaboratorPayload {
            uid: uid.into(),
            nome: nome.into(),
            permissoes,
        }
    }

    fn tipo(name: &str, color: &str) -> TipoDeOperacao {
        TipoDeOperacao {
            name: name.into(),
            color: color.into(),
        }
    }

    #[tokio::test]
    async fn unknown_user_is_owner_of_own_account() {
        let fx = Fixture::new();
        let actor = fx.users.load_actor("novo").await.unwrap();
        assert_eq!(actor.uid, "novo");
        assert!(!actor.is_collaborator());
        assert!(actor.can_manage_operation_types());
    }

    #[tokio::test]
    async fn collaborator_joins_only_after_accepting_invite() {
        let fx = Fixture::new();
        let gerente = owner("gerente-1");
        let convidado = fx
            .users
            .add_collaborator(Some(&gerente), convidar("colab-1", "João", Permissoes::default()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(convidado.gerente_uid, None);
        assert_eq!(convidado.convite.as_ref().map(|c| c.gerente_uid.as_str()), Some("gerente-1"));
        assert!(!fx.users.load_actor("colab-1").await.unwrap().is_collaborator());

        let aceito = fx.users.accept_invite(Some(&owner("colab-1"))).await.unwrap().unwrap();
        assert_eq!(aceito.nome, "João");
        assert_eq!(aceito.convite, None);

        let actor = fx.users.load_actor("colab-1").await.unwrap();
        assert_eq!(actor.gerente_uid.as_deref(), Some("gerente-1"));
        assert!(!actor.can_manage_others_operations());

        let equipe = fx.users.list_collaborators(Some(&gerente)).await.unwrap();
        assert_eq!(equipe.len(), 1);
        assert_eq!(equipe[0].nome, "João");
    }

    #[tokio::test]
    async fn collaborators_cannot_register_collaborators_nor_join_two_teams() {
        let fx = Fixture::new();
        let colab = collaborator("colab-1", "gerente-1", Permissoes::all());
        let result = fx
            .users
            .add_collaborator(
                Some(&colab),
                NewCollaboratorPayload {
                    uid: "x".into(),
                    nome: "X".into(),
                    permissoes: Permissoes::default(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let payload = || convidar("colab-9", "Nove", Permissoes::default());
        fx.users.add_collaborator(Some(&owner("gerente-1")), payload()).await.unwrap();
        fx.users.accept_invite(Some(&owner("colab-9"))).await.unwrap();
        let result = fx.users.add_collaborator(Some(&owner("gerente-2")), payload()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn invite_cannot_take_over_an_account_with_data() {
        let fx = Fixture::new();
        let vitima = owner("vitima");
        fx.customers.create(Some(&vitima), customer_form("Maria")).await.unwrap();

        // O convite sozinho não muda o escopo do convidado
        fx.users
            .add_collaborator(Some(&owner("atacante")), convidar("vitima", "Vítima", Permissoes::all()))
            .await
            .unwrap();
        let actor = fx.users.load_actor("vitima").await.unwrap();
        assert!(!actor.is_collaborator());
        assert_eq!(fx.customers.list(Some(&vitima)).await.unwrap().len(), 1);

        let result = fx.users.accept_invite(Some(&vitima)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(!fx.users.load_actor("vitima").await.unwrap().is_collaborator());
        assert!(fx
            .users
            .list_collaborators(Some(&owner("atacante")))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn manager_of_a_team_cannot_be_invited() {
        let fx = Fixture::new();
        fx.users
            .add_collaborator(Some(&owner("gerente-1")), convidar("colab-1", "João", Permissoes::default()))
            .await
            .unwrap();
        fx.users.accept_invite(Some(&owner("colab-1"))).await.unwrap();

        let result = fx
            .users
            .add_collaborator(Some(&owner("gerente-2")), convidar("gerente-1", "G", Permissoes::default()))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn declined_invite_is_cleared() {
        let fx = Fixture::new();
        fx.users
            .add_collaborator(Some(&owner("gerente-1")), convidar("colab-1", "João", Permissoes::default()))
            .await
            .unwrap();

        let profile = fx.users.decline_invite(Some(&owner("colab-1"))).await.unwrap().unwrap();
        assert_eq!(profile.convite, None);
        assert!(matches!(
            fx.users.accept_invite(Some(&owner("colab-1"))).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn profile_update_keeps_team_link() {
        let fx = Fixture::new();
        let gerente = owner("gerente-1");
        fx.users
            .add_collaborator(Some(&gerente), convidar("colab-1", "João", Permissoes::default()))
            .await
            .unwrap();
        fx.users.accept_invite(Some(&owner("colab-1"))).await.unwrap();

        let colab = collaborator("colab-1", "gerente-1", Permissoes::default());
        let profile = fx
            .users
            .update_me(
                Some(&colab),
                UpdateProfilePayload {
                    nome: "João Lima".into(),
                    avatar: Some("https://exemplo.com/a.png".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.nome, "João Lima");
        assert_eq!(profile.gerente_uid.as_deref(), Some("gerente-1"));
    }

    #[tokio::test]
    async fn operation_types_live_on_scope_owner() {
        let fx = Fixture::new();
        let gerente = owner("gerente-1");
        let colab = collaborator("colab-1", "gerente-1", Permissoes::default());

        fx.users.add_operation_type(Some(&gerente), tipo("Consignado", "#111")).await.unwrap();
        fx.users.add_operation_type(Some(&gerente), tipo("Consignado", "#222")).await.unwrap();
        fx.users.add_operation_type(Some(&gerente), tipo("FGTS", "#333")).await.unwrap();

        let vistos = fx.users.list_operation_types(Some(&colab)).await.unwrap();
        assert_eq!(vistos, vec![tipo("Consignado", "#222"), tipo("FGTS", "#333")]);

        let result = fx.users.remove_operation_type(Some(&colab), "FGTS").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let restantes = fx.users.remove_operation_type(Some(&gerente), "FGTS").await.unwrap();
        assert_eq!(restantes, vec![tipo("Consignado", "#222")]);
        assert!(matches!(
            fx.users.remove_operation_type(Some(&gerente), "FGTS").await,
            Err(AppError::NotFound(_))
        ));
    }
}
