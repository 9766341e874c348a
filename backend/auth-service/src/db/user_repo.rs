//! Postgres-backed principal store.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use token_core::Role;
use uuid::Uuid;

use crate::db::{PrincipalStore, StoreError};
use crate::models::AppUser;

pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        PgPrincipalStore { pool }
    }
}

/// Raw row; `role` is TEXT in the schema and parsed on the way out.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    last_name: String,
    first_name: String,
    email: String,
    password_hash: String,
    role: String,
    active: bool,
}

impl UserRow {
    fn into_user(self) -> Result<AppUser, StoreError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError(format!("unknown role '{}' for {}", self.role, self.email)))?;

        Ok(AppUser {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            active: self.active,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, last_name, first_name, email, password_hash, role, active FROM users";

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AppUser>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_COLUMNS} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    async fn save(&self, user: AppUser) -> Result<AppUser, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, last_name, first_name, email, password_hash, role, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.last_name)
        .bind(&user.first_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.active)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_role(&self, email: &str, role: Role) -> Result<Option<AppUser>, StoreError> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE email = $2")
            .bind(role.as_str())
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_email(email).await
    }

    async fn set_active(&self, email: &str, active: bool) -> Result<Option<AppUser>, StoreError> {
        let result = sqlx::query("UPDATE users SET active = $1 WHERE email = $2")
            .bind(active)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_email(email).await
    }

    async fn list(&self) -> Result<Vec<AppUser>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_COLUMNS} ORDER BY email"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}
