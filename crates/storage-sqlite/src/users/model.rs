//! Database models for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use ambitions_core::users::{normalize_image_path, User, UserStatus};

/// Database model for users
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub name: String,
    pub lastname: String,
    pub image: Option<String>,
    pub employee_id: Option<String>,
    pub workday_id: Option<String>,
    pub org_id: Option<String>,
    pub job_id: Option<String>,
    pub manager_id: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            image: normalize_image_path(db.image.as_deref()),
            id: db.id,
            email: db.email,
            name: db.name,
            lastname: db.lastname,
            employee_id: db.employee_id,
            workday_id: db.workday_id,
            org_id: db.org_id,
            job_id: db.job_id,
            manager_id: db.manager_id,
            status: UserStatus::from_storage(&db.status),
        }
    }
}
