/// Project endpoints
///
/// Thin handlers: validate the request shape, call the project service,
/// wrap the result in the response envelope. All authorization lives in
/// the service.
///
/// # Endpoints
///
/// - `GET    /api/projects` - Projects the caller is a member of
/// - `POST   /api/projects` - Create a project (caller becomes owner)
/// - `GET    /api/projects/:id` - Project with owner/members expanded
/// - `PUT    /api/projects/:id` - Update (owner only)
/// - `DELETE /api/projects/:id` - Delete with task cascade (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{DataResponse, ListResponse, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::project::{
        CreateProject, Project, ProjectDetail, ProjectStatus, ProjectSummary, UpdateProject,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Project description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Initial member user IDs (the owner is added automatically)
    pub members: Option<Vec<Uuid>>,

    /// Initial status
    pub status: Option<ProjectStatus>,
}

/// Update project request; only supplied fields change
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// New status
    pub status: Option<ProjectStatus>,

    /// Replacement member set (the owner is always retained)
    pub members: Option<Vec<Uuid>>,
}

/// List the caller's projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ListResponse<ProjectSummary>>> {
    let projects = state.projects.list(auth.user_id).await?;

    Ok(Json(ListResponse::new(projects)))
}

/// Fetch one project with owner and members expanded
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<ProjectDetail>>> {
    let project = state.projects.get(auth.user_id, id).await?;

    Ok(Json(DataResponse::new(project)))
}

/// Create a project
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Project>>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = state
        .projects
        .create(
            auth.user_id,
            CreateProject {
                name: req.name,
                description: req.description.unwrap_or_default(),
                members: req.members.unwrap_or_default(),
                status: req.status,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(project))))
}

/// Update a project (owner only)
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<DataResponse<Project>>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = state
        .projects
        .update(
            auth.user_id,
            id,
            UpdateProject {
                name: req.name,
                description: req.description,
                status: req.status,
                members: req.members,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(project)))
}

/// Delete a project and its tasks (owner only)
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.projects.delete(auth.user_id, id).await?;

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_validation() {
        let valid = CreateProjectRequest {
            name: "Launch".to_string(),
            description: Some("Q1 launch".to_string()),
            members: None,
            status: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateProjectRequest {
            name: String::new(),
            description: None,
            members: None,
            status: None,
        };
        assert!(empty_name.validate().is_err());

        let long_description = CreateProjectRequest {
            name: "Launch".to_string(),
            description: Some("x".repeat(501)),
            members: None,
            status: None,
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_update_project_request_allows_partial_patch() {
        let patch = UpdateProjectRequest {
            name: None,
            description: Some("New description".to_string()),
            status: None,
            members: None,
        };
        assert!(patch.validate().is_ok());
    }
}
