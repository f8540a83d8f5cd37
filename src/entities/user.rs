// User Entity - the authenticated identity held by SessionState

use super::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
