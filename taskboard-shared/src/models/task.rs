/// Task model and database operations
///
/// Tasks belong to exactly one project and record who created them and who
/// they are assigned to. Assignee/membership consistency (every assignee is
/// a project member) is enforced by the task service as a side effect of
/// writes, not rejected here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to UUID[] NOT NULL DEFAULT '{}',
///     created_by UUID NOT NULL REFERENCES users(id),
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     deadline TIMESTAMPTZ,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started (default)
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Completed,
}

impl TaskStatus {
    /// Gets status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority
    Low,

    /// Medium priority (default)
    Medium,

    /// High priority
    High,
}

impl TaskPriority {
    /// Gets priority as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Project this task belongs to (immutable)
    #[serde(rename = "project")]
    pub project_id: Uuid,

    /// Assigned user IDs
    pub assigned_to: Vec<Uuid>,

    /// User who created the task (immutable)
    pub created_by: Uuid,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Free-form tags
    pub tags: Vec<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial assignees
    pub assigned_to: Vec<Uuid>,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Initial priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Free-form tags
    pub tags: Vec<String>,
}

/// Input for updating a task
///
/// All fields are optional. Only non-None fields are updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New deadline (Some(None) clears it)
    pub deadline: Option<Option<DateTime<Utc>>>,

    /// Replacement assignee set
    pub assigned_to: Option<Vec<Uuid>>,

    /// Replacement tags
    pub tags: Option<Vec<String>>,
}

/// Per-status task count, one row of the stats aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusCount {
    /// Task status
    pub status: TaskStatus,

    /// Number of tasks in that status
    pub count: i64,
}

const TASK_COLUMNS: &str = "id, title, description, project_id, assigned_to, created_by, \
                            status, priority, deadline, tags, created_at, updated_at";

impl Task {
    /// Creates a new task under `project_id`, created by `created_by`
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        created_by: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, assigned_to, created_by,
                               status, priority, deadline, tags)
            VALUES ($1, $2, $3, $4, $5,
                    COALESCE($6, 'todo'::task_status),
                    COALESCE($7, 'medium'::task_priority),
                    $8, $9)
            RETURNING id, title, description, project_id, assigned_to, created_by,
                      status, priority, deadline, tags, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(project_id)
        .bind(&data.assigned_to)
        .bind(created_by)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.deadline)
        .bind(&data.tags)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to a project
    ///
    /// Returns None when the task does not exist or belongs to a different
    /// project.
    pub async fn find_in_project(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND project_id = $2"
        ))
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a page of tasks for a project, newest-created first
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks for a project
    pub async fn count_for_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        Ok(total)
    }

    /// Lists a page of tasks across all projects where `user_id` is the
    /// creator or an assignee, newest-created first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE created_by = $1 OR $1 = ANY(assigned_to) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks where `user_id` is the creator or an assignee
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks WHERE created_by = $1 OR $1 = ANY(assigned_to)",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(total)
    }

    /// Updates a task, applying only the fields present in `data`
    ///
    /// Scoped to the project so a task cannot be moved between projects.
    /// Returns the updated task, or None if it no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.deadline.is_some() {
            bind_count += 1;
            query.push_str(&format!(", deadline = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND project_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(project_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(deadline) = data.deadline {
            q = q.bind(deadline);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(tags) = data.tags {
            q = q.bind(tags);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task scoped to its project
    ///
    /// Returns the deleted task's terminal state, or None if it no longer
    /// exists.
    pub async fn delete(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 AND project_id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes every task under a project, inside an open transaction
    ///
    /// Used by the project cascade delete.
    pub async fn delete_all_in_project(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Computes the per-status task histogram for a project
    ///
    /// A single GROUP BY covers both the per-status counts and (by
    /// summation) the project total.
    pub async fn status_counts(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let counts = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM tasks
            WHERE project_id = $1
            GROUP BY status
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization_is_kebab_case() {
        assert_eq!(serde_json::to_value(TaskStatus::Todo).unwrap(), "todo");
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in-progress"
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Completed).unwrap(),
            "completed"
        );

        let parsed: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_value(TaskPriority::Medium).unwrap(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
    }

    #[test]
    fn test_task_serializes_project_and_camel_case_fields() {
        let project = Uuid::new_v4();
        let creator = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write brief".to_string(),
            description: None,
            project_id: project,
            assigned_to: vec![],
            created_by: creator,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            deadline: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["project"], serde_json::to_value(project).unwrap());
        assert_eq!(json["createdBy"], serde_json::to_value(creator).unwrap());
        assert_eq!(json["status"], "todo");
        assert!(json.get("assignedTo").is_some());
    }
}
