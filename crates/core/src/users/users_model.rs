//! Users domain models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }

    /// Lenient parse for values coming out of storage; unknown maps to inactive.
    pub fn from_storage(value: &str) -> Self {
        if value.eq_ignore_ascii_case("active") {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        }
    }
}

/// Domain model representing a user. `email` is the lookup key across stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
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
    #[serde(default)]
    pub status: UserStatus,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.lastname).trim().to_string()
    }
}

/// Normalizes a profile image reference into something a browser can load:
/// absolute URLs and rooted paths pass through, bare file names get a
/// leading `/`, blanks become `None`.
pub fn normalize_image_path(image: Option<&str>) -> Option<String> {
    let image = image.map(str::trim).filter(|i| !i.is_empty())?;
    if image.starts_with("http://") || image.starts_with("https://") || image.starts_with('/') {
        Some(image.to_string())
    } else {
        Some(format!("/{}", image.trim_start_matches("./")))
    }
}

/// Filters accepted by `UserRepositoryTrait::find_many`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCriteria {
    pub org_id: Option<String>,
    pub manager_id: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserCriteria {
    pub fn matches(&self, user: &User) -> bool {
        (self.org_id.is_none() || self.org_id == user.org_id)
            && (self.manager_id.is_none() || self.manager_id == user.manager_id)
            && self.status.map_or(true, |s| s == user.status)
    }
}
