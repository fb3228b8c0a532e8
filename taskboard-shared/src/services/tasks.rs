/// Task access and aggregate service
///
/// Enforces task-level permissions, maintains the assignee→member
/// invariant, and serves cached task statistics.
///
/// Authorization rules:
///
/// - **create/list**: any project member
/// - **update**: project owner, task creator, or a current assignee
/// - **delete**: project owner or task creator only
/// - **stats**: any project member
///
/// Assigning a non-member never fails; the assignee is auto-enrolled into
/// the project's member set as a side effect of the write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::{invalidation, keys, Cache};
use crate::models::project::Project;
use crate::models::task::{CreateTask, StatusCount, Task, UpdateTask};

use super::{PageRequest, Pagination, ServiceError, ServiceResult};

/// One page of tasks plus pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// Tasks on this page, newest-created first
    pub tasks: Vec<Task>,

    /// Pagination metadata
    pub pagination: Pagination,
}

/// Task statistics payload, the shape cached under `stats:<proj>:<user>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStats {
    /// Per-status task counts
    pub stats: Vec<StatusCount>,

    /// Aggregate summary
    pub summary: StatsSummary,
}

/// Summary block of the statistics payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Total tasks in the project
    pub total_tasks: i64,

    /// When this payload was computed
    pub last_updated: DateTime<Utc>,
}

/// Task service with injected store and cache handles
#[derive(Clone)]
pub struct TaskService {
    db: PgPool,
    cache: Cache,
}

impl TaskService {
    /// Creates the service
    pub fn new(db: PgPool, cache: Cache) -> Self {
        Self { db, cache }
    }

    /// Creates a task under a project the actor is a member of
    ///
    /// Non-empty assignee sets are unioned into the project's members
    /// (set-union, no duplicates). Invalidates the project-list and stats
    /// caches of the actor and every assignee.
    ///
    /// # Errors
    ///
    /// `NotFound` if no project exists with the actor among its members
    /// (membership and existence are deliberately indistinguishable here).
    pub async fn create(
        &self,
        actor: Uuid,
        project_id: Uuid,
        data: CreateTask,
    ) -> ServiceResult<Task> {
        Project::find_for_member(&self.db, project_id, actor)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        let task = Task::create(&self.db, project_id, actor, data).await?;

        if !task.assigned_to.is_empty() {
            Project::add_members(&self.db, project_id, &task.assigned_to).await?;
        }

        let mut touched = task.assigned_to.clone();
        touched.push(actor);
        invalidation::project_lists(&self.cache, &touched).await;
        invalidation::task_stats(&self.cache, project_id, &touched).await;

        Ok(task)
    }

    /// Lists a page of the project's tasks, newest-created first
    ///
    /// # Errors
    ///
    /// `NotFound` if the actor is not a member of the project.
    pub async fn list(
        &self,
        actor: Uuid,
        project_id: Uuid,
        page: PageRequest,
    ) -> ServiceResult<TaskPage> {
        Project::find_for_member(&self.db, project_id, actor)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        let tasks = Task::list_for_project(&self.db, project_id, page.limit, page.offset()).await?;
        let total = Task::count_for_project(&self.db, project_id).await?;

        Ok(TaskPage {
            tasks,
            pagination: Pagination::new(total, &page),
        })
    }

    /// Lists a page of tasks across all projects where the actor is the
    /// creator or an assignee
    pub async fn list_all_for_user(
        &self,
        actor: Uuid,
        page: PageRequest,
    ) -> ServiceResult<TaskPage> {
        let tasks = Task::list_for_user(&self.db, actor, page.limit, page.offset()).await?;
        let total = Task::count_for_user(&self.db, actor).await?;

        Ok(TaskPage {
            tasks,
            pagination: Pagination::new(total, &page),
        })
    }

    /// Fetches a single task
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    /// - `Forbidden` if the actor is not a project member
    /// - `NotFound` if the task does not exist under that project
    pub async fn get(&self, actor: Uuid, project_id: Uuid, task_id: Uuid) -> ServiceResult<Task> {
        let project = Project::find_by_id(&self.db, project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        if !project.members.contains(&actor) {
            return Err(ServiceError::Forbidden(
                "Not authorized: Project membership required".to_string(),
            ));
        }

        Task::find_in_project(&self.db, task_id, project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))
    }

    /// Updates a task
    ///
    /// Project and task are loaded concurrently. The patch applies only
    /// the supplied fields; a resulting non-empty assignee set is unioned
    /// into the project members. Invalidates caches touching the actor,
    /// the new assignees, and the original creator.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task or the project is missing
    /// - `Forbidden` unless the actor is the project owner, the task
    ///   creator, or a current assignee
    pub async fn update(
        &self,
        actor: Uuid,
        project_id: Uuid,
        task_id: Uuid,
        data: UpdateTask,
    ) -> ServiceResult<Task> {
        let (project, task) = tokio::try_join!(
            Project::find_by_id(&self.db, project_id),
            Task::find_by_id(&self.db, task_id),
        )?;

        let task = task.ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;
        let project =
            project.ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        let is_project_owner = project.owner_id == actor;
        let is_task_creator = task.created_by == actor;
        let is_task_assignee = task.assigned_to.contains(&actor);

        if !is_project_owner && !is_task_creator && !is_task_assignee {
            return Err(ServiceError::Forbidden(
                "Not authorized to update this task".to_string(),
            ));
        }

        let updated = Task::update(&self.db, task_id, project_id, data)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        if !updated.assigned_to.is_empty() {
            Project::add_members(&self.db, project_id, &updated.assigned_to).await?;
        }

        let mut touched = updated.assigned_to.clone();
        touched.push(actor);
        touched.push(updated.created_by);
        invalidation::project_lists(&self.cache, &touched).await;
        invalidation::task_stats(&self.cache, project_id, &touched).await;

        Ok(updated)
    }

    /// Deletes a task; project owner or task creator only
    ///
    /// Assignees cannot delete. Returns the deleted task's terminal
    /// state; caches of the actor, prior assignees, and creator are
    /// invalidated.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task or the project is missing
    /// - `Forbidden` if the actor is neither owner nor creator
    pub async fn delete(
        &self,
        actor: Uuid,
        project_id: Uuid,
        task_id: Uuid,
    ) -> ServiceResult<Task> {
        let (project, task) = tokio::try_join!(
            Project::find_by_id(&self.db, project_id),
            Task::find_by_id(&self.db, task_id),
        )?;

        let task = task.ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;
        let project =
            project.ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        let is_project_owner = project.owner_id == actor;
        let is_task_creator = task.created_by == actor;

        if !is_project_owner && !is_task_creator {
            return Err(ServiceError::Forbidden(
                "Not authorized to delete this task".to_string(),
            ));
        }

        let deleted = Task::delete(&self.db, task_id, project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        let mut touched = deleted.assigned_to.clone();
        touched.push(actor);
        touched.push(deleted.created_by);
        invalidation::project_lists(&self.cache, &touched).await;
        invalidation::task_stats(&self.cache, project_id, &touched).await;

        Ok(deleted)
    }

    /// Computes the project's task-status histogram, cache-aside
    ///
    /// All project tasks count toward the stats visible to any member;
    /// there is no per-user task filter. A cache hit is returned
    /// unchanged, so two reads within the TTL see an identical payload.
    ///
    /// # Errors
    ///
    /// `Forbidden` if the actor is not a project member (existence-style
    /// check; a missing project also lands here).
    pub async fn stats(&self, actor: Uuid, project_id: Uuid) -> ServiceResult<TaskStats> {
        let has_access = Project::is_member(&self.db, project_id, actor).await?;
        if !has_access {
            return Err(ServiceError::Forbidden(
                "Not authorized to view statistics for this project".to_string(),
            ));
        }

        let cache_key = keys::task_stats(project_id, actor);

        if let Some(cached) = self.cache.get_json::<TaskStats>(&cache_key).await {
            return Ok(cached);
        }

        let counts = Task::status_counts(&self.db, project_id).await?;
        let total_tasks = counts.iter().map(|c| c.count).sum();

        let stats = TaskStats {
            stats: counts,
            summary: StatsSummary {
                total_tasks,
                last_updated: Utc::now(),
            },
        };

        self.cache
            .put_json(&cache_key, &stats, keys::CACHE_TTL_SECS)
            .await;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;

    #[test]
    fn test_stats_payload_shape() {
        let stats = TaskStats {
            stats: vec![StatusCount {
                status: TaskStatus::Todo,
                count: 1,
            }],
            summary: StatsSummary {
                total_tasks: 1,
                last_updated: Utc::now(),
            },
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["stats"][0]["status"], "todo");
        assert_eq!(json["stats"][0]["count"], 1);
        assert_eq!(json["summary"]["totalTasks"], 1);
        assert!(json["summary"].get("lastUpdated").is_some());
    }

    #[test]
    fn test_stats_payload_roundtrips_through_cache_json() {
        let stats = TaskStats {
            stats: vec![
                StatusCount {
                    status: TaskStatus::Todo,
                    count: 3,
                },
                StatusCount {
                    status: TaskStatus::InProgress,
                    count: 2,
                },
            ],
            summary: StatsSummary {
                total_tasks: 5,
                last_updated: Utc::now(),
            },
        };

        let payload = serde_json::to_string(&stats).unwrap();
        let restored: TaskStats = serde_json::from_str(&payload).unwrap();

        // Byte-identical reserialization: a cache hit returns exactly what
        // was stored
        assert_eq!(serde_json::to_string(&restored).unwrap(), payload);
    }
}
