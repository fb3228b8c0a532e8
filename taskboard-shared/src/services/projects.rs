/// Project access and lifecycle service
///
/// Enforces who can see and mutate a project and keeps the membership
/// invariant (owner ∈ members) and the derived project-list cache coherent.
///
/// Authorization rules:
///
/// - **read** (list/get): any member
/// - **mutate** (update/delete): owner only
///
/// Deleting a project cascades to its tasks inside a single transaction,
/// so no orphaned task can survive a completed delete.

use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::{invalidation, keys, Cache};
use crate::models::project::{
    CreateProject, Project, ProjectDetail, ProjectSummary, UpdateProject,
};
use crate::models::task::Task;
use crate::models::user::User;

use super::{ServiceError, ServiceResult};

/// Project service with injected store and cache handles
#[derive(Clone)]
pub struct ProjectService {
    db: PgPool,
    cache: Cache,
}

impl ProjectService {
    /// Creates the service
    ///
    /// Constructed once at process start; both handles are cheap clones of
    /// process-wide singletons.
    pub fn new(db: PgPool, cache: Cache) -> Self {
        Self { db, cache }
    }

    /// Lists all projects where the actor is a member, cache-aside
    ///
    /// A disconnected or erroring cache is a transparent miss and never
    /// fails the call.
    pub async fn list(&self, actor: Uuid) -> ServiceResult<Vec<ProjectSummary>> {
        let cache_key = keys::project_list(actor);

        if let Some(cached) = self.cache.get_json::<Vec<ProjectSummary>>(&cache_key).await {
            return Ok(cached);
        }

        let projects = Project::list_for_member(&self.db, actor).await?;

        self.cache
            .put_json(&cache_key, &projects, keys::CACHE_TTL_SECS)
            .await;

        Ok(projects)
    }

    /// Fetches a single project with owner and members expanded
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    /// - `Forbidden` if the actor is not a member
    pub async fn get(&self, actor: Uuid, project_id: Uuid) -> ServiceResult<ProjectDetail> {
        let project = Project::find_by_id(&self.db, project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        if !project.members.contains(&actor) {
            return Err(ServiceError::Forbidden(
                "Not authorized: Project membership required".to_string(),
            ));
        }

        let users = User::summaries_by_ids(&self.db, &project.members).await?;

        Ok(ProjectDetail::from_parts(project, users))
    }

    /// Creates a project owned by the actor
    ///
    /// The member set is the union of caller-supplied members and the
    /// actor. Every resulting member's cached project list is invalidated
    /// (a create with initial members touches several users' lists).
    pub async fn create(&self, actor: Uuid, data: CreateProject) -> ServiceResult<Project> {
        let project = Project::create(&self.db, actor, data).await?;

        invalidation::project_lists(&self.cache, &project.members).await;

        Ok(project)
    }

    /// Updates a project, owner only
    ///
    /// Applies only the fields present in the patch. A members update
    /// always retains the owner.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    /// - `Forbidden` if the actor is not the owner
    pub async fn update(
        &self,
        actor: Uuid,
        project_id: Uuid,
        data: UpdateProject,
    ) -> ServiceResult<Project> {
        let project = Project::find_by_id(&self.db, project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        if project.owner_id != actor {
            return Err(ServiceError::Forbidden(
                "Not authorized: Owner access required".to_string(),
            ));
        }

        let updated = Project::update(&self.db, project_id, project.owner_id, data)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        invalidation::project_lists(&self.cache, &updated.members).await;

        Ok(updated)
    }

    /// Deletes a project and all of its tasks, owner only
    ///
    /// The cascade runs in one transaction: either the project and every
    /// task under it are gone, or nothing is. Returns the deleted
    /// project's terminal state.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    /// - `Forbidden` if the actor is not the owner
    pub async fn delete(&self, actor: Uuid, project_id: Uuid) -> ServiceResult<Project> {
        let project = Project::find_by_id(&self.db, project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        if project.owner_id != actor {
            return Err(ServiceError::Forbidden(
                "Not authorized: Owner access required".to_string(),
            ));
        }

        let mut tx = self.db.begin().await.map_err(ServiceError::Database)?;
        Task::delete_all_in_project(&mut tx, project_id).await?;
        Project::delete(&mut tx, project_id).await?;
        tx.commit().await.map_err(ServiceError::Database)?;

        invalidation::project_lists(&self.cache, &project.members).await;

        Ok(project)
    }
}
