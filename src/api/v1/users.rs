//! User management endpoints

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ValidatedJson};
use crate::domain::user::UserId;
use crate::infrastructure::user::{CreateUserRequest, UpdateUserRequest, UserResponse};

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_OFFSET: usize = 0;

/// Request to create a new user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserApiRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

impl From<CreateUserApiRequest> for CreateUserRequest {
    fn from(request: CreateUserApiRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
        }
    }
}

/// Request to update a user; empty strings count as omitted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserApiRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email)]
    pub email: Option<String>,
}

impl From<UpdateUserApiRequest> for UpdateUserRequest {
    fn from(request: UpdateUserApiRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

/// Raw pagination parameters; anything unusable falls back to the defaults
#[derive(Debug, Clone, Default)]
pub struct ListUsersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListUsersQuery {
    /// Keeps the first value of each known key and ignores the rest
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        query
    }

    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(DEFAULT_LIMIT)
    }

    fn offset(&self) -> usize {
        self.offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(DEFAULT_OFFSET)
    }
}

/// List users response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub limit: usize,
    pub offset: usize,
}

/// Profile view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: UserResponse,
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<u32>()
        .map(|id| UserId::new(i64::from(id)))
        .map_err(|_| ApiError::bad_request("Invalid user ID").with_param("id"))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserApiRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(username = %request.username, "Creating user");

    let user = state
        .user_service
        .create_user(request.into())
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let query = match query {
        Ok(Query(pairs)) => ListUsersQuery::from_pairs(pairs),
        Err(rejection) => {
            debug!(error = %rejection, "Ignoring unreadable list query");
            ListUsersQuery::default()
        }
    };
    let limit = query.limit();
    let offset = query.offset();

    debug!(limit, offset, "Listing users");

    let users = state
        .user_service
        .list_users(limit, offset)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ListUsersResponse {
        users,
        limit,
        offset,
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;

    debug!(user_id = %id, "Getting user");

    let user = state.user_service.get_user(id).await.map_err(ApiError::from)?;

    Ok(Json(user))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;

    debug!(user_id = %id, "Updating user");

    let user = state
        .user_service
        .update_user(id, request.into())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(user))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;

    debug!(user_id = %id, "Deleting user");

    state
        .user_service
        .delete_user(id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/{id}/profile
pub async fn get_user_profile(
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(profile) = get_user(state, id).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// PUT /api/v1/users/{id}/profile
pub async fn update_user_profile(
    state: State<AppState>,
    id: Path<String>,
    request: ValidatedJson<UpdateUserApiRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(profile) = update_user(state, id, request).await?;
    Ok(Json(ProfileResponse { profile }))
}
