/// Project model and database operations
///
/// A project has exactly one owner and a set of members. The owner is
/// immutable after creation and is always present in the member set; every
/// write path in this module preserves that invariant.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     members UUID[] NOT NULL DEFAULT '{}',
///     status project_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::user::UserSummary;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Project is in progress (default)
    Active,

    /// Project has been completed
    Completed,

    /// Project is archived and read-mostly
    Archived,
}

impl ProjectStatus {
    /// Gets status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    /// Owner user ID (immutable after creation)
    #[serde(rename = "owner")]
    pub owner_id: Uuid,

    /// Member user IDs; always contains the owner
    pub members: Vec<Uuid>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Default)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    /// Initial members supplied by the caller (the owner is added
    /// automatically)
    pub members: Vec<Uuid>,

    /// Initial status (defaults to active)
    pub status: Option<ProjectStatus>,
}

/// Input for updating an existing project
///
/// All fields are optional. Only non-None fields are updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    /// New project name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<ProjectStatus>,

    /// Replacement member set (the owner is re-added if absent)
    pub members: Option<Vec<Uuid>>,
}

/// Project list item with the owner expanded to a summary identity
///
/// This is the shape cached under `projects:<userId>`, so it round-trips
/// through JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    /// Owner identity (id, name, email)
    pub owner: UserSummary,

    /// Member user IDs
    pub members: Vec<Uuid>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProjectSummary {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            owner: UserSummary {
                id: row.try_get("owner_id")?,
                name: row.try_get("owner_name")?,
                email: row.try_get("owner_email")?,
            },
            members: row.try_get("members")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Single project with owner and members expanded to summary identities
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    /// Project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Project description
    pub description: String,

    /// Owner identity
    pub owner: UserSummary,

    /// Member identities
    pub members: Vec<UserSummary>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl ProjectDetail {
    /// Assembles a detail view from a project row and the summaries of its
    /// owner and members
    ///
    /// Member summaries are re-ordered to match the project's member list.
    pub fn from_parts(project: Project, mut users: Vec<UserSummary>) -> Self {
        let owner = users
            .iter()
            .find(|u| u.id == project.owner_id)
            .cloned()
            .unwrap_or(UserSummary {
                id: project.owner_id,
                name: String::new(),
                email: String::new(),
            });

        users.sort_by_key(|u| {
            project
                .members
                .iter()
                .position(|m| *m == u.id)
                .unwrap_or(usize::MAX)
        });

        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner,
            members: users,
            status: project.status,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Appends `user` to `members` if not already present, preserving order
pub fn ensure_member(members: &mut Vec<Uuid>, user: Uuid) {
    if !members.contains(&user) {
        members.push(user);
    }
}

/// Deduplicates a member list, preserving first-occurrence order
pub fn dedup_members(members: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(members.len());
    for m in members {
        if !seen.contains(m) {
            seen.push(*m);
        }
    }
    seen
}

const PROJECT_COLUMNS: &str =
    "id, name, description, owner_id, members, status, created_at, updated_at";

impl Project {
    /// Creates a new project owned by `owner_id`
    ///
    /// The member set is the union of the caller-supplied members and the
    /// owner, deduplicated.
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let mut members = dedup_members(&data.members);
        ensure_member(&mut members, owner_id);

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id, members, status)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'active'::project_status))
            RETURNING id, name, description, owner_id, members, status,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(owner_id)
        .bind(&members)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID, scoped to membership of `user_id`
    ///
    /// Returns None when the project does not exist or the user is not a
    /// member, without distinguishing the two cases.
    pub async fn find_for_member(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND $2 = ANY(members)"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects where `user_id` is a member, newest first, with
    /// the owner expanded
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT p.id, p.name, p.description, p.members, p.status,
                   p.created_at, p.updated_at,
                   u.id AS owner_id, u.name AS owner_name, u.email AS owner_email
            FROM projects p
            JOIN users u ON u.id = p.owner_id
            WHERE $1 = ANY(p.members)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Checks whether `user_id` is a member of the project
    ///
    /// Existence-style query; false when the project does not exist.
    pub async fn is_member(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1 AND $2 = ANY(members))",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Updates a project, applying only the fields present in `data`
    ///
    /// A members update always retains the owner. Returns the updated
    /// project, or None if it no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        let members = data.members.map(|m| {
            let mut members = dedup_members(&m);
            ensure_member(&mut members, owner_id);
            members
        });
        if members.is_some() {
            bind_count += 1;
            query.push_str(&format!(", members = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(members) = members {
            q = q.bind(members);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Unions `user_ids` into the project's member set
    ///
    /// Set-union semantics: existing order is preserved and no duplicates
    /// are introduced. Returns the resulting member list, or None if the
    /// project does not exist.
    pub async fn add_members(
        pool: &PgPool,
        id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        let additions = dedup_members(user_ids);

        let members: Option<Vec<Uuid>> = sqlx::query_scalar(
            r#"
            UPDATE projects
            SET members = members || (
                    SELECT COALESCE(array_agg(u), '{}')
                    FROM unnest($2::uuid[]) AS u
                    WHERE NOT (u = ANY(members))
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING members
            "#,
        )
        .bind(id)
        .bind(&additions)
        .fetch_optional(pool)
        .await?;

        Ok(members)
    }

    /// Deletes a project row inside an open transaction
    ///
    /// Callers delete the project's tasks in the same transaction so the
    /// cascade is atomic.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::Active).unwrap(),
            "active"
        );
        assert_eq!(
            serde_json::to_value(ProjectStatus::Archived).unwrap(),
            "archived"
        );
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_ensure_member_appends_once() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut members = vec![other];

        ensure_member(&mut members, owner);
        ensure_member(&mut members, owner);

        assert_eq!(members, vec![other, owner]);
    }

    #[test]
    fn test_dedup_members_preserves_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let deduped = dedup_members(&[a, b, a, b, a]);

        assert_eq!(deduped, vec![a, b]);
    }

    #[test]
    fn test_project_serializes_owner_field() {
        let owner = Uuid::new_v4();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Launch".to_string(),
            description: "Q1 launch".to_string(),
            owner_id: owner,
            members: vec![owner],
            status: ProjectStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["owner"], serde_json::to_value(owner).unwrap());
        assert_eq!(json["status"], "active");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_detail_orders_members_like_project() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Launch".to_string(),
            description: "Q1 launch".to_string(),
            owner_id: owner,
            members: vec![owner, member],
            status: ProjectStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let users = vec![
            UserSummary {
                id: member,
                name: "V".to_string(),
                email: "v@example.com".to_string(),
            },
            UserSummary {
                id: owner,
                name: "U".to_string(),
                email: "u@example.com".to_string(),
            },
        ];

        let detail = ProjectDetail::from_parts(project, users);

        assert_eq!(detail.owner.id, owner);
        assert_eq!(detail.members[0].id, owner);
        assert_eq!(detail.members[1].id, member);
    }
}
