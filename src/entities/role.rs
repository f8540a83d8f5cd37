// 👤 Role Entity - closed set of access levels
//
// Navigation visibility is decided against this enum only. Strings are parsed
// once at the boundary (config, CLI, auth backend) and never compared again.

use crate::error::RoleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Grower using the app for their own fields (most restrictive)
    #[default]
    Farmer,

    /// Crop specialist reviewing diagnoses
    Agronomist,

    /// Extension officer covering a region
    Extension,

    /// Platform administrator
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Farmer, Role::Agronomist, Role::Extension, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Agronomist => "agronomist",
            Role::Extension => "extension",
            Role::Admin => "admin",
        }
    }

    /// Parse a role name (case-insensitive, surrounding whitespace ignored)
    pub fn parse(value: &str) -> Result<Role, RoleError> {
        match value.trim().to_lowercase().as_str() {
            "farmer" => Ok(Role::Farmer),
            "agronomist" => Ok(Role::Agronomist),
            "extension" => Ok(Role::Extension),
            "admin" => Ok(Role::Admin),
            _ => Err(RoleError(value.to_string())),
        }
    }

    /// Resolve an optional role; absence never grants more than `Farmer`
    pub fn effective(role: Option<Role>) -> Role {
        role.unwrap_or_default()
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
