use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::database::models::{NewProject, Project, ProjectChanges};
use crate::database::{DatabaseError, ProjectRepository, Store};
use crate::services::{missing_reference, optional_text, required_text, ServiceError, ServiceResult};

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_CLIENT_NAME_CHARS: usize = 200;

/// Owner-supplied project fields for create and update.
#[derive(Debug, Clone)]
pub struct ProjectInput {
    pub name: String,
    pub client_name: Option<String>,
    pub hourly_rate: Decimal,
}

impl ProjectInput {
    fn validated(self) -> ServiceResult<ProjectChanges> {
        Ok(ProjectChanges {
            name: required_text("naam", &self.name, MAX_NAME_CHARS)?,
            client_name: optional_text("klantnaam", self.client_name.as_deref(), MAX_CLIENT_NAME_CHARS)?,
            hourly_rate: self.hourly_rate,
        })
    }
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_for_owner(&self, owner_user_id: &str) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects_for_owner(owner_user_id).await?)
    }

    /// Owner and `is_active` are always set server-side.
    pub async fn create(&self, owner_user_id: &str, input: ProjectInput) -> ServiceResult<Project> {
        let fields = input.validated()?;

        let inserted = self
            .store
            .insert_project(NewProject {
                name: fields.name,
                client_name: fields.client_name,
                hourly_rate: fields.hourly_rate,
                owner_user_id: owner_user_id.to_string(),
            })
            .await;
        let project = match inserted {
            Ok(project) => project,
            // the token outlived its account
            Err(DatabaseError::ForeignKeyViolation(_)) => {
                return Err(missing_reference(self.store.as_ref(), None).await)
            }
            Err(other) => return Err(other.into()),
        };

        info!(owner = owner_user_id, project_id = project.id, "project created");
        Ok(project)
    }

    pub async fn update(&self, owner_user_id: &str, project_id: i32, input: ProjectInput) -> ServiceResult<Project> {
        self.owned_project(owner_user_id, project_id).await?;
        let changes = input.validated()?;

        let project = self
            .store
            .update_project(project_id, changes)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        info!(owner = owner_user_id, project_id, "project updated");
        Ok(project)
    }

    /// Deleting cascades to the project's time entries and detaches its trips.
    pub async fn delete(&self, owner_user_id: &str, project_id: i32) -> ServiceResult<()> {
        self.owned_project(owner_user_id, project_id).await?;

        if !self.store.delete_project(project_id).await? {
            return Err(project_not_found(project_id));
        }

        info!(owner = owner_user_id, project_id, "project deleted");
        Ok(())
    }

    /// Existence first, ownership second.
    async fn owned_project(&self, owner_user_id: &str, project_id: i32) -> ServiceResult<Project> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        if !project.is_owned_by(owner_user_id) {
            warn!(caller = owner_user_id, project_id, "project access denied");
            return Err(ServiceError::Forbidden("You do not have access to this project".to_string()));
        }
        Ok(project)
    }
}

fn project_not_found(project_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Project {} not found", project_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn input(name: &str) -> ProjectInput {
        ProjectInput {
            name: name.to_string(),
            client_name: Some("ACME".to_string()),
            hourly_rate: Decimal::new(50, 0),
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let projects = ctx.state.projects();

        let p = projects.create(&alice, input("Alpha")).await.unwrap();

        let mine = projects.list_for_owner(&alice).await.unwrap();
        assert_eq!(mine, vec![p.clone()]);
        assert!(projects.list_for_owner(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_sets_owner_and_active_flag() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;

        let p = ctx.state.projects().create(&alice, input("  Alpha ")).await.unwrap();
        assert_eq!(p.id, 1);
        assert_eq!(p.name, "Alpha");
        assert_eq!(p.owner_user_id, alice);
        assert!(p.is_active);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_regardless_of_other_fields() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;

        for name in ["", "   ", "\t\n"] {
            let err = ctx.state.projects().create(&alice, input(name)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }), "{name:?} gave {err:?}");
        }
        assert!(ctx.state.projects().list_for_owner(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_in_place() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;
        let projects = ctx.state.projects();
        let p = projects.create(&alice, input("Alpha")).await.unwrap();

        let updated = projects
            .update(
                &alice,
                p.id,
                ProjectInput {
                    name: "Beta".to_string(),
                    client_name: None,
                    hourly_rate: Decimal::new(7550, 2),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, p.id);
        assert_eq!(updated.name, "Beta");
        assert_eq!(updated.client_name, None);
        assert_eq!(updated.hourly_rate, Decimal::new(7550, 2));
        assert_eq!(updated.owner_user_id, alice);
    }

    #[tokio::test]
    async fn check_order_is_existence_ownership_validation() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let projects = ctx.state.projects();
        let p = projects.create(&alice, input("Alpha")).await.unwrap();

        // missing id beats everything, even for a blank name
        let err = projects.update(&bob, 999, input("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        // non-owner with a blank name sees Forbidden, not Validation
        let err = projects.update(&bob, p.id, input("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = projects.update(&alice, p.id, input(" ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn non_owner_cannot_mutate() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let projects = ctx.state.projects();
        let p = projects.create(&alice, input("Alpha")).await.unwrap();

        assert!(matches!(
            projects.update(&bob, p.id, input("Hijacked")).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(projects.delete(&bob, p.id).await, Err(ServiceError::Forbidden(_))));

        let unchanged = projects.list_for_owner(&alice).await.unwrap();
        assert_eq!(unchanged, vec![p]);
    }

    #[tokio::test]
    async fn delete_removes_project_and_its_time_entries() {
        let ctx = TestContext::new().await;
        let alice = ctx.user("alice").await;
        let p = ctx.state.projects().create(&alice, input("Alpha")).await.unwrap();
        ctx.start_entry(&alice, p.id).await;

        ctx.state.projects().delete(&alice, p.id).await.unwrap();

        assert!(ctx.state.projects().list_for_owner(&alice).await.unwrap().is_empty());
        assert!(ctx.state.time_entries().list_for_owner(&alice).await.unwrap().is_empty());
        assert!(matches!(
            ctx.state.projects().delete(&alice, p.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
