/// Task endpoints
///
/// Thin handlers over the task service. The only request-shaping logic
/// here is the strict `assignedTo` contract (an array of user IDs or
/// nothing; a bare scalar is rejected) and the empty-patch rejection on
/// update.
///
/// # Endpoints
///
/// - `GET    /api/projects/:projectId/tasks` - Paginated project tasks
/// - `POST   /api/projects/:projectId/tasks` - Create a task
/// - `GET    /api/projects/:projectId/tasks/stats` - Status histogram (cached)
/// - `GET    /api/projects/:projectId/tasks/:taskId` - One task
/// - `PUT    /api/projects/:projectId/tasks/:taskId` - Update a task
/// - `DELETE /api/projects/:projectId/tasks/:taskId` - Delete a task
/// - `GET    /api/tasks/all` - Caller's tasks across all projects

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{DataResponse, MessageResponse, PageResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
    services::tasks::TaskStats,
    services::PageRequest,
};
use uuid::Uuid;
use validator::Validate;

/// Raw pagination query parameters
///
/// Kept as strings so non-numeric values fall back to defaults instead of
/// failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<String>,

    /// Page size
    pub limit: Option<String>,
}

impl PageQuery {
    fn to_request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Assignee user IDs; must be an array when present
    pub assigned_to: Option<serde_json::Value>,

    /// Initial status
    pub status: Option<TaskStatus>,

    /// Initial priority
    pub priority: Option<TaskPriority>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Free-form tags
    pub tags: Option<Vec<String>>,
}

/// Update task request; only supplied fields change
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New deadline; an explicit null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    /// Replacement assignee set; must be an array when present
    pub assigned_to: Option<serde_json::Value>,

    /// Replacement tags
    pub tags: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    /// True when the patch carries no fields at all
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.assigned_to.is_none()
            && self.tags.is_none()
    }
}

/// Distinguishes an absent field from an explicit null
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses the strict `assignedTo` contract: absent means empty, anything
/// other than an array of user IDs is a 400
fn parse_assignees(value: Option<serde_json::Value>) -> Result<Vec<Uuid>, ApiError> {
    const MESSAGE: &str = "assignedTo must be an array of user ids";

    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let serde_json::Value::Array(items) = value else {
        return Err(ApiError::BadRequest(MESSAGE.to_string()));
    };

    items
        .into_iter()
        .map(|item| {
            item.as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| ApiError::BadRequest(MESSAGE.to_string()))
        })
        .collect()
}

/// List a page of the project's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PageResponse<Task>>> {
    let page = state
        .tasks
        .list(auth.user_id, project_id, query.to_request())
        .await?;

    Ok(Json(PageResponse::new(page.tasks, page.pagination)))
}

/// List the caller's tasks across all projects
pub async fn list_all_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PageResponse<Task>>> {
    let page = state
        .tasks
        .list_all_for_user(auth.user_id, query.to_request())
        .await?;

    Ok(Json(PageResponse::new(page.tasks, page.pagination)))
}

/// Create a task under a project
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Task>>)> {
    req.validate().map_err(ApiError::from_validation)?;
    let assigned_to = parse_assignees(req.assigned_to)?;

    let task = state
        .tasks
        .create(
            auth.user_id,
            project_id,
            CreateTask {
                title: req.title,
                description: req.description,
                assigned_to,
                status: req.status,
                priority: req.priority,
                deadline: req.deadline,
                tags: req.tags.unwrap_or_default(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(task))))
}

/// Fetch one task
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<DataResponse<Task>>> {
    let task = state.tasks.get(auth.user_id, project_id, task_id).await?;

    Ok(Json(DataResponse::new(task)))
}

/// Update a task
///
/// # Errors
///
/// - `400 Bad Request`: Empty patch, validation failure, or malformed
///   `assignedTo`
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<DataResponse<Task>>> {
    if req.is_empty() {
        return Err(ApiError::BadRequest(
            "Please provide fields to update".to_string(),
        ));
    }

    req.validate().map_err(ApiError::from_validation)?;

    let assigned_to = match req.assigned_to {
        Some(value) => Some(parse_assignees(Some(value))?),
        None => None,
    };

    let task = state
        .tasks
        .update(
            auth.user_id,
            project_id,
            task_id,
            UpdateTask {
                title: req.title,
                description: req.description,
                status: req.status,
                priority: req.priority,
                deadline: req.deadline,
                assigned_to,
                tags: req.tags,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(task)))
}

/// Delete a task (project owner or task creator)
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .tasks
        .delete(auth.user_id, project_id, task_id)
        .await?;

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// Task status histogram for a project (60s cache)
pub async fn task_stats(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<TaskStats>>> {
    let stats = state.tasks.stats(auth.user_id, project_id).await?;

    Ok(Json(DataResponse::new(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_assignees_accepts_array_of_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let value = json!([a.to_string(), b.to_string()]);

        assert_eq!(parse_assignees(Some(value)).unwrap(), vec![a, b]);
        assert_eq!(parse_assignees(None).unwrap(), Vec::<Uuid>::new());
        assert_eq!(parse_assignees(Some(json!([]))).unwrap(), Vec::<Uuid>::new());
    }

    #[test]
    fn test_parse_assignees_rejects_scalar() {
        let id = Uuid::new_v4();

        assert!(parse_assignees(Some(json!(id.to_string()))).is_err());
        assert!(parse_assignees(Some(json!(42))).is_err());
        assert!(parse_assignees(Some(json!(["not-a-uuid"]))).is_err());
        assert!(parse_assignees(Some(json!({"id": id.to_string()}))).is_err());
    }

    #[test]
    fn test_update_request_empty_patch_detection() {
        let empty: UpdateTaskRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());

        let with_title: UpdateTaskRequest =
            serde_json::from_value(json!({"title": "New title"})).unwrap();
        assert!(!with_title.is_empty());
    }

    #[test]
    fn test_update_request_null_deadline_clears() {
        let clears: UpdateTaskRequest =
            serde_json::from_value(json!({"deadline": null})).unwrap();
        assert_eq!(clears.deadline, Some(None));
        assert!(!clears.is_empty());

        let absent: UpdateTaskRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.deadline, None);
    }

    #[test]
    fn test_page_query_parsing() {
        let query = PageQuery {
            page: Some("2".to_string()),
            limit: Some("5".to_string()),
        };
        let request = query.to_request();
        assert_eq!(request.page, 2);
        assert_eq!(request.limit, 5);

        let garbage = PageQuery {
            page: Some("two".to_string()),
            limit: None,
        };
        assert_eq!(garbage.to_request(), PageRequest::default());
    }
}
