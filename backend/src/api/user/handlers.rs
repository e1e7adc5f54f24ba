//! Handler functions for user listing API endpoints.

use crate::api::common::{ApiError, Paginated, PaginationFilter, PaginationMeta};
use crate::auth::models::UserInfo;
use crate::errors::ServiceError;
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Query},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;
use validator::Validate;

/// Lists users ordered by email, paginated
#[axum::debug_handler]
pub async fn list_users(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Query(pagination): Query<PaginationFilter>,
) -> Result<ResponseJson<Paginated<UserInfo>>, ApiError> {
    if let Err(validation_errors) = pagination.validate() {
        return Err(ServiceError::from_validation(validation_errors).into());
    }

    tracing::debug!(user_id = %claims.user_id(), "listing users");

    let repo = UserRepository::new(&pool);
    let users = repo
        .list_users(&pagination)
        .await
        .map_err(ServiceError::from)?;
    let total = repo.count_users().await.map_err(ServiceError::from)?;

    let items = users.iter().map(UserInfo::from).collect();
    let meta = PaginationMeta::from_filter(&pagination, total);

    Ok(ResponseJson(Paginated::new(items, meta)))
}
