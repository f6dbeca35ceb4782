//! HTTP Basic authentication for the dashboard page.
//!
//! Every user shares one password; the username decides the scope. An empty
//! password turns the gate off and every caller is treated as an admin.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::config::AuthSettings;
use crate::departments::DepartmentDirectory;
use crate::error::{DashboardError, Result};

pub const ADMIN_SCOPE: &str = "admin";
pub const REALM: &str = "dashboard";

/// What a user may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserScope {
    Admin,
    Department { department: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub username: String,
    #[serde(flatten)]
    pub scope: UserScope,
}

#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    password: String,
    users: BTreeMap<String, UserScope>,
}

impl AccessTable {
    /// Department scopes are canonicalised through `directory`.
    pub fn new(settings: &AuthSettings, directory: &DepartmentDirectory) -> Self {
        let users = settings
            .users
            .iter()
            .map(|(name, scope)| {
                let scope = if scope.trim().eq_ignore_ascii_case(ADMIN_SCOPE) {
                    UserScope::Admin
                } else {
                    UserScope::Department {
                        department: directory.canonical_name(scope),
                    }
                };
                (name.clone(), scope)
            })
            .collect();
        Self {
            password: settings.password.clone(),
            users,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.password.is_empty()
    }

    /// Check an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedUser> {
        if !self.is_enabled() {
            return Ok(AuthenticatedUser {
                username: "anonymous".to_string(),
                scope: UserScope::Admin,
            });
        }

        let header = header.ok_or_else(|| unauthorized("missing credentials"))?;
        let (username, password) = decode_basic(header)?;

        if !constant_time_eq(password.as_bytes(), self.password.as_bytes()) {
            return Err(unauthorized("invalid credentials"));
        }
        let scope = self
            .users
            .get(&username)
            .cloned()
            .ok_or_else(|| unauthorized("invalid credentials"))?;
        Ok(AuthenticatedUser { username, scope })
    }
}

fn unauthorized(message: &str) -> DashboardError {
    DashboardError::Unauthorized(message.to_string())
}

/// Split `Basic base64(user:pass)` into its two parts.
fn decode_basic(header: &str) -> Result<(String, String)> {
    let encoded = header
        .trim()
        .strip_prefix("Basic ")
        .or_else(|| header.trim().strip_prefix("basic "))
        .ok_or_else(|| unauthorized("expected Basic credentials"))?;
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| unauthorized("malformed credentials"))?;
    let text = String::from_utf8(bytes).map_err(|_| unauthorized("malformed credentials"))?;
    let (user, pass) = text
        .split_once(':')
        .ok_or_else(|| unauthorized("malformed credentials"))?;
    Ok((user.to_string(), pass.to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
