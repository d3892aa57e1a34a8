use ambitions_core::users::{User, UserCriteria, UserRepositoryTrait};
use ambitions_core::Result;

use super::model::UserDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::users;
use async_trait::async_trait;
use diesel::prelude::*;

use std::sync::Arc;

/// Read-only user lookups. Users are provisioned outside this service.
pub struct UserRepository {
    pool: Arc<DbPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        UserRepository { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_many(&self, criteria: UserCriteria) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = users::table.select(UserDB::as_select()).into_boxed();

        if let Some(org_id) = criteria.org_id {
            query = query.filter(users::org_id.eq(org_id));
        }
        if let Some(manager_id) = criteria.manager_id {
            query = query.filter(users::manager_id.eq(manager_id));
        }
        if let Some(status) = criteria.status {
            query = query.filter(users::status.eq(status.as_str()));
        }

        let rows = query
            .order((users::lastname.asc(), users::name.asc()))
            .load::<UserDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(User::from))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations};
    use ambitions_core::users::UserStatus;
    use chrono::Utc;

    fn user_db(id: &str, manager_id: Option<&str>, status: &str) -> UserDB {
        let now = Utc::now().naive_utc();
        UserDB {
            id: id.to_string(),
            email: format!("{}@corp.test", id),
            name: id.to_uppercase(),
            lastname: "Lima".to_string(),
            image: Some("img/profile.png".to_string()),
            employee_id: Some(format!("E-{}", id)),
            workday_id: None,
            org_id: Some("org-1".to_string()),
            job_id: None,
            manager_id: manager_id.map(str::to_string),
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn setup(rows: Vec<UserDB>) -> (UserRepository, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = init(tmp.path().join("users.db").to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        if !rows.is_empty() {
            let mut conn = pool.get().unwrap();
            diesel::insert_into(users::table)
                .values(&rows)
                .execute(&mut conn)
                .unwrap();
        }
        (UserRepository::new(pool), tmp)
    }

    #[tokio::test]
    async fn lookups_by_email_and_id() {
        let (repo, _tmp) = setup(vec![user_db("boss", None, "active")]);

        let by_email = repo.get_by_email("boss@corp.test").await.unwrap().unwrap();
        assert_eq!(by_email.id, "boss");
        assert_eq!(by_email.image.as_deref(), Some("/img/profile.png"));
        assert_eq!(by_email.status, UserStatus::Active);

        let by_id = repo.find_by_id("boss").await.unwrap().unwrap();
        assert_eq!(by_id, by_email);

        let shouted = repo.get_by_email("BOSS@Corp.Test").await.unwrap().unwrap();
        assert_eq!(shouted.id, "boss");
    }

    #[tokio::test]
    async fn unknown_keys_are_none() {
        let (repo, _tmp) = setup(vec![]);
        assert!(repo.get_by_email("ghost@corp.test").await.unwrap().is_none());
        assert!(repo.find_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_many_filters_by_manager_and_status() {
        let (repo, _tmp) = setup(vec![
            user_db("boss", None, "active"),
            user_db("ana", Some("boss"), "active"),
            user_db("bo", Some("boss"), "inactive"),
        ]);

        let reports = repo
            .find_many(UserCriteria {
                manager_id: Some("boss".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);

        let active_reports = repo
            .find_many(UserCriteria {
                manager_id: Some("boss".to_string()),
                status: Some(UserStatus::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active_reports.len(), 1);
        assert_eq!(active_reports[0].id, "ana");
    }
}
