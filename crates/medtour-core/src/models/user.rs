use medtour_storage::CollectionSpec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{Record, record_id};
use crate::validation::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    Admin,
    #[default]
    Staff,
}

/// A dashboard account as exposed by the API.
///
/// The stored document also carries `passwordHash`, which this type never
/// deserializes, so no read can leak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Create request for a user: the profile plus a plaintext password.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(flatten)]
    pub user: User,
    pub password: String,
}

impl Record for User {
    const ENTITY: &'static str = "User";
    const COLLECTION: CollectionSpec = CollectionSpec::new("users", &["email"]);
    const PROTECTED_FIELDS: &'static [&'static str] = &["password", "passwordHash"];

    record_id!();

    fn validate(&self) -> Result<()> {
        Validator::new()
            .min_len("name", &self.name, 2)
            .email("email", &self.email)
            .finish()
    }
}
