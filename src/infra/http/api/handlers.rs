use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::posts::CreatePostCommand;
use crate::domain::types::PostId;

use super::error::ApiError;
use super::extract::{ApiForm, ApiJson, ApiPath, ApiQuery};
use super::middleware::Principal;
use super::models::{
    LoginForm, PostCreateRequest, PostListQuery, PostUpdateRequest, RegisterRequest,
    TokenResponse, UserResponse,
};
use super::state::ApiState;

pub async fn register(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.register(payload.into()).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn login(
    State(state): State<ApiState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.accounts.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::from(token)))
}

pub async fn create_post(
    State(state): State<ApiState>,
    Principal(actor): Principal,
    ApiJson(payload): ApiJson<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreatePostCommand::new(payload.title, payload.content);
    let post = state.posts.create(actor, command).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_all(query.offset(), query.limit()).await?;
    Ok(Json(posts))
}

pub async fn list_my_posts(
    State(state): State<ApiState>,
    Principal(actor): Principal,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_by_author(actor).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<PostId>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get_by_id(id).await?;
    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<ApiState>,
    Principal(actor): Principal,
    ApiPath(id): ApiPath<PostId>,
    ApiJson(payload): ApiJson<PostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.update(id, actor, payload.into()).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Principal(actor): Principal,
    ApiPath(id): ApiPath<PostId>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
