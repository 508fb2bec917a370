//! Sub-admin accounts: secondary operators bound one-to-one to an employee,
//! holding a fixed set of capability flags.

use chrono::Utc;
use entity::subadmins;
use platform_api::{ApiError, ApiResult, Page, PageRequest, validate};
use platform_authn::{
    AuthnError, check_password_policy, hash_password, verify_against_dummy, verify_password,
};
use platform_db::{DbPool, contains_ci, fetch_page, store_error};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{admins, employees};

const ROLE: &str = "subadmin";
const MAX_USERNAME_LEN: usize = 64;

/// The closed permission catalog. Flags accept booleans or 0/1; absent
/// flags are off.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, deserialize_with = "flag", alias = "View payslip details")]
    pub view_payslips: bool,
    #[serde(default, deserialize_with = "flag", alias = "Generate payslip")]
    pub generate_payslip: bool,
    #[serde(default, deserialize_with = "flag", alias = "View Invoice details")]
    pub view_invoices: bool,
    #[serde(default, deserialize_with = "flag", alias = "Generate invoice details")]
    pub generate_invoice: bool,
    #[serde(default, deserialize_with = "flag", alias = "Add Employee Details")]
    pub add_employee: bool,
    #[serde(default, deserialize_with = "flag", alias = "View Employee Details")]
    pub view_employees: bool,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(de::Error::custom(format!(
            "permission flag must be true, false, 0 or 1, got {other}"
        ))),
    }
}

impl Permissions {
    fn from_model(model: &subadmins::Model) -> Self {
        Self {
            view_payslips: model.can_view_payslips,
            generate_payslip: model.can_generate_payslip,
            view_invoices: model.can_view_invoices,
            generate_invoice: model.can_generate_invoice,
            add_employee: model.can_add_employee,
            view_employees: model.can_view_employees,
        }
    }

    fn apply(self, active: &mut subadmins::ActiveModel) {
        active.can_view_payslips = Set(self.view_payslips);
        active.can_generate_payslip = Set(self.generate_payslip);
        active.can_view_invoices = Set(self.view_invoices);
        active.can_generate_invoice = Set(self.generate_invoice);
        active.can_add_employee = Set(self.add_employee);
        active.can_view_employees = Set(self.view_employees);
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default, rename = "adminId", alias = "adminid", alias = "admin_id")]
    pub admin_id: Option<String>,
    #[serde(default, rename = "employeeId", alias = "employeeid", alias = "employee_id")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Clone, Default, Deserialize)]
pub struct SubadminChanges {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

#[derive(Clone, Default, Deserialize)]
pub struct SubadminUpdate {
    #[serde(default, rename = "subadminId", alias = "subadminid", alias = "subadmin_id")]
    pub subadmin_id: Option<String>,
    #[serde(default)]
    pub updates: SubadminChanges,
}

#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubadminQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Listing shape; the password hash is never part of it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubadminView {
    pub subadmin_id: Uuid,
    pub employee_id: String,
    pub username: String,
    pub permissions: Permissions,
    pub created_at: String,
    pub updated_at: String,
}

impl From<subadmins::Model> for SubadminView {
    fn from(model: subadmins::Model) -> Self {
        Self {
            permissions: Permissions::from_model(&model),
            subadmin_id: model.id,
            employee_id: model.employee_id,
            username: model.username,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoginGrant {
    pub role: &'static str,
    pub permissions: Permissions,
}

fn policy_error(err: AuthnError) -> ApiError {
    match err {
        AuthnError::WeakPassword => ApiError::validation("password", err.to_string()),
        other => ApiError::internal(other.into()),
    }
}

fn hash(password: &str) -> ApiResult<String> {
    check_password_policy(password).map_err(policy_error)?;
    hash_password(password).map_err(policy_error)
}

fn username(value: String) -> ApiResult<String> {
    let value = validate::required_text("username", Some(value))?;
    validate::max_length("username", &value, MAX_USERNAME_LEN)?;
    Ok(value)
}

fn parse_id(value: Option<String>) -> ApiResult<Uuid> {
    let raw = validate::required_text("subadminId", value)?;
    Uuid::parse_str(&raw).map_err(|_| ApiError::not_found("Subadmin not found"))
}

async fn find_by_username(db: &DbPool, username: &str) -> ApiResult<Option<subadmins::Model>> {
    subadmins::Entity::find()
        .filter(subadmins::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(store_error)
}

/// Checks run in a fixed order: required fields, authorizing admin,
/// password policy, employee existence, existing binding, username.
#[instrument(skip_all, fields(employee_id = ?input.employee_id, username = ?input.username))]
pub async fn register(db: &DbPool, input: Registration) -> ApiResult<Uuid> {
    let admin_id = validate::required_text("adminId", input.admin_id)?;
    let employee_id = validate::required_text("employeeId", input.employee_id)?;
    let username = username(validate::required("username", input.username)?)?;
    let password = validate::required("password", input.password)?;
    if password.trim().is_empty() {
        return Err(ApiError::validation("password", "password is required"));
    }

    admins::authorize(db, &admin_id).await?;
    check_password_policy(&password).map_err(policy_error)?;
    employees::find_model(db, &employee_id)
        .await
        .map_err(|err| match err {
            ApiError::NotFound(_) => ApiError::not_found("No such employee"),
            other => other,
        })?;

    let bound = subadmins::Entity::find()
        .filter(subadmins::Column::EmployeeId.eq(employee_id.as_str()))
        .one(db)
        .await
        .map_err(store_error)?;
    if bound.is_some() {
        return Err(ApiError::conflict(
            "Subadmin credentials already exist for this employee, please login",
        ));
    }
    if find_by_username(db, &username).await?.is_some() {
        return Err(ApiError::conflict("Username already taken"));
    }

    let password_hash = hash(&password)?;
    let subadmin_id = Uuid::new_v4();
    let now = Utc::now().into();
    let mut active = subadmins::ActiveModel {
        id: Set(subadmin_id),
        employee_id: Set(employee_id.clone()),
        username: Set(username),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    input.permissions.apply(&mut active);
    active.insert(db).await.map_err(store_error)?;

    info!(%subadmin_id, %employee_id, "subadmin registered");
    Ok(subadmin_id)
}

#[instrument(skip_all, fields(subadmin_id = ?input.subadmin_id))]
pub async fn update(db: &DbPool, input: SubadminUpdate) -> ApiResult<()> {
    let id = parse_id(input.subadmin_id)?;
    let existing = subadmins::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::not_found("Subadmin not found"))?;

    let changes = input.updates;
    if changes.username.is_none() && changes.password.is_none() && changes.permissions.is_none() {
        return Err(ApiError::invalid("No valid fields to update"));
    }

    let mut active: subadmins::ActiveModel = existing.into();
    if let Some(new_username) = changes.username {
        let new_username = username(new_username)?;
        let taken = subadmins::Entity::find()
            .filter(subadmins::Column::Username.eq(new_username.as_str()))
            .filter(subadmins::Column::Id.ne(id))
            .one(db)
            .await
            .map_err(store_error)?;
        if taken.is_some() {
            return Err(ApiError::conflict("Username already in use"));
        }
        active.username = Set(new_username);
    }
    if let Some(password) = changes.password {
        active.password_hash = Set(hash(&password)?);
    }
    if let Some(permissions) = changes.permissions {
        permissions.apply(&mut active);
    }
    active.updated_at = Set(Utc::now().into());
    active.update(db).await.map_err(store_error)?;

    info!(subadmin_id = %id, "subadmin updated");
    Ok(())
}

#[instrument(skip(db))]
pub async fn delete(db: &DbPool, subadmin_id: Option<String>) -> ApiResult<()> {
    let id = parse_id(subadmin_id)?;
    let result = subadmins::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(store_error)?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Subadmin not found"));
    }
    info!(subadmin_id = %id, "subadmin deleted");
    Ok(())
}

/// Substring search over username and employee id.
#[instrument(skip_all, fields(search = ?query.search))]
pub async fn list(db: &DbPool, query: SubadminQuery) -> ApiResult<Page<SubadminView>> {
    let params = query.page.params();
    let mut select = subadmins::Entity::find().order_by_asc(subadmins::Column::Username);
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(contains_ci(subadmins::Column::Username, term))
                .add(contains_ci(subadmins::Column::EmployeeId, term)),
        );
    }
    let (rows, total) = fetch_page(db, select, params)
        .await
        .map_err(store_error)?;
    let items = rows.into_iter().map(SubadminView::from).collect();
    Ok(Page::new(items, total, params))
}

/// Verifies credentials and returns the stored permission flags. Unknown
/// usernames and wrong passwords fail identically.
#[instrument(skip_all, fields(username = ?input.username))]
pub async fn login(db: &DbPool, input: Credentials) -> ApiResult<LoginGrant> {
    let (Some(username), Some(password)) = (
        input.username.filter(|u| !u.trim().is_empty()),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::invalid("Missing username or password"));
    };

    let Some(account) = find_by_username(db, username.trim()).await? else {
        verify_against_dummy(&password);
        return Err(ApiError::invalid_credentials());
    };
    match verify_password(&password, &account.password_hash) {
        Ok(true) => {
            info!(subadmin_id = %account.id, "subadmin logged in");
            Ok(LoginGrant {
                role: ROLE,
                permissions: Permissions::from_model(&account),
            })
        }
        Ok(false) => Err(ApiError::invalid_credentials()),
        Err(err) => {
            warn!(subadmin_id = %account.id, error = %err, "stored password hash unusable");
            Err(ApiError::invalid_credentials())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_db, seed_employee};
    use serde_json::json;

    async fn seeded() -> DbPool {
        let db = memory_db().await;
        admins::ensure_admin(&db, "ADM001", "Root").await.unwrap();
        seed_employee(&db, "EMP0001").await;
        seed_employee(&db, "EMP0002").await;
        db
    }

    fn registration(employee_id: &str, username: &str, password: &str) -> Registration {
        serde_json::from_value(json!({
            "adminid": "ADM001",
            "employeeid": employee_id,
            "username": username,
            "password": password,
            "permissions": {"view_payslips": 1, "generate_invoice": true, "View Employee Details": 1}
        }))
        .unwrap()
    }

    #[test]
    fn flags_accept_booleans_and_integers() {
        let perms: Permissions =
            serde_json::from_value(json!({"view_payslips": 1, "add_employee": false})).unwrap();
        assert!(perms.view_payslips);
        assert!(!perms.add_employee);
        assert!(!perms.view_invoices);
        assert!(serde_json::from_value::<Permissions>(json!({"view_payslips": 7})).is_err());
    }

    #[tokio::test]
    async fn weak_password_is_a_validation_error() {
        let db = seeded().await;
        let err = register(&db, registration("EMP0001", "ops", "weakpass"))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("password"));
        register(&db, registration("EMP0001", "ops", "Str0ng!Pass"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn registration_guards() {
        let db = seeded().await;
        let mut unauthorized = registration("EMP0001", "ops", "Str0ng!Pass");
        unauthorized.admin_id = Some("ADM999".into());
        assert!(matches!(
            register(&db, unauthorized).await.unwrap_err(),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            register(&db, registration("EMP0404", "ops", "Str0ng!Pass"))
                .await
                .unwrap_err(),
            ApiError::NotFound(_)
        ));

        register(&db, registration("EMP0001", "ops", "Str0ng!Pass"))
            .await
            .unwrap();
        assert!(matches!(
            register(&db, registration("EMP0001", "ops2", "Str0ng!Pass"))
                .await
                .unwrap_err(),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            register(&db, registration("EMP0002", "ops", "Str0ng!Pass"))
                .await
                .unwrap_err(),
            ApiError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn login_returns_flags_and_hides_which_half_failed() {
        let db = seeded().await;
        register(&db, registration("EMP0001", "ops", "Str0ng!Pass"))
            .await
            .unwrap();

        let credentials = |username: &str, password: &str| Credentials {
            username: Some(username.into()),
            password: Some(password.into()),
        };
        let grant = login(&db, credentials("ops", "Str0ng!Pass")).await.unwrap();
        assert_eq!(grant.role, "subadmin");
        assert!(grant.permissions.view_payslips);
        assert!(grant.permissions.generate_invoice);
        assert!(grant.permissions.view_employees);
        assert!(!grant.permissions.add_employee);

        let wrong_password = login(&db, credentials("ops", "Wr0ng!Pass")).await.unwrap_err();
        let unknown_user = login(&db, credentials("ghost", "Str0ng!Pass")).await.unwrap_err();
        assert!(matches!(wrong_password, ApiError::Unauthorized(_)));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.status(), unknown_user.status());
    }

    #[tokio::test]
    async fn update_checks_username_password_and_emptiness() {
        let db = seeded().await;
        let first = register(&db, registration("EMP0001", "ops", "Str0ng!Pass"))
            .await
            .unwrap();
        register(&db, registration("EMP0002", "audit", "Str0ng!Pass"))
            .await
            .unwrap();

        let patch = |updates: serde_json::Value| -> SubadminUpdate {
            serde_json::from_value(json!({"subadminId": first.to_string(), "updates": updates}))
                .unwrap()
        };
        assert!(matches!(
            update(&db, patch(json!({}))).await.unwrap_err(),
            ApiError::Validation { .. }
        ));
        assert!(matches!(
            update(&db, patch(json!({"username": "audit"}))).await.unwrap_err(),
            ApiError::Conflict(_)
        ));
        assert_eq!(
            update(&db, patch(json!({"password": "short"}))).await.unwrap_err().field(),
            Some("password")
        );

        update(&db, patch(json!({"username": "ops", "password": "N3w!Passw0rd", "permissions": {"add_employee": 1}})))
            .await
            .unwrap();
        let grant = login(
            &db,
            Credentials {
                username: Some("ops".into()),
                password: Some("N3w!Passw0rd".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            grant.permissions,
            Permissions {
                add_employee: true,
                ..Permissions::default()
            }
        );
    }

    #[tokio::test]
    async fn listing_never_exposes_hashes_and_delete_is_hard() {
        let db = seeded().await;
        let id = register(&db, registration("EMP0001", "ops", "Str0ng!Pass"))
            .await
            .unwrap();
        let query: SubadminQuery = serde_json::from_value(json!({"search": "emp0001"})).unwrap();
        let page = list(&db, query).await.unwrap();
        assert_eq!(page.total, 1);
        let rendered = serde_json::to_string(&page).unwrap();
        assert!(!rendered.contains("argon2"));
        assert!(!rendered.contains("Str0ng!Pass"));

        delete(&db, Some(id.to_string())).await.unwrap();
        assert!(matches!(
            delete(&db, Some(id.to_string())).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            update(
                &db,
                SubadminUpdate {
                    subadmin_id: Some(id.to_string()),
                    updates: SubadminChanges {
                        username: Some("x".into()),
                        ..Default::default()
                    },
                }
            )
            .await
            .unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
