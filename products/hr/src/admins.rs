use chrono::Utc;
use entity::admins;
use platform_api::{ApiError, ApiResult, validate};
use platform_db::{DbPool, store_error};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use tracing::{info, instrument};
use uuid::Uuid;

/// Creates the admin record unless one with the same identifier exists.
/// Returns whether a row was inserted.
#[instrument(skip(db))]
pub async fn ensure_admin(db: &DbPool, admin_id: &str, name: &str) -> ApiResult<bool> {
    let admin_id = validate::required_text("adminId", Some(admin_id.to_string()))?;
    if find(db, &admin_id).await?.is_some() {
        return Ok(false);
    }
    admins::ActiveModel {
        id: Set(Uuid::new_v4()),
        admin_id: Set(admin_id.clone()),
        name: Set(name.trim().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(store_error)?;
    info!(%admin_id, "admin provisioned");
    Ok(true)
}

pub async fn find(db: &DbPool, admin_id: &str) -> ApiResult<Option<admins::Model>> {
    admins::Entity::find()
        .filter(admins::Column::AdminId.eq(admin_id))
        .one(db)
        .await
        .map_err(store_error)
}

/// Fails with `Forbidden` unless the admin exists.
pub async fn authorize(db: &DbPool, admin_id: &str) -> ApiResult<()> {
    match find(db, admin_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::forbidden("Invalid adminId")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_db;

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let db = memory_db().await;
        assert!(ensure_admin(&db, "ADM001", "Root").await.unwrap());
        assert!(!ensure_admin(&db, "ADM001", "Root").await.unwrap());
        authorize(&db, "ADM001").await.unwrap();
        assert!(matches!(
            authorize(&db, "ADM404").await.unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }
}
