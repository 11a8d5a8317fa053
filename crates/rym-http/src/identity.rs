//! Authenticated caller identity.
//!
//! Authentication middleware stores a [`Principal`] in the request
//! extensions; authorization and handlers read it from there.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub subject: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    /// Scheme that established the identity, e.g. `Bearer`
    pub authentication_type: String,
    #[serde(skip)]
    pub claims: Map<String, Value>,
}

impl Principal {
    pub fn new(subject: impl Into<String>, authentication_type: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            authentication_type: authentication_type.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_claims(mut self, claims: Map<String, Value>) -> Self {
        self.claims = claims;
        self
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|role| self.is_in_role(role))
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Name when present, otherwise the subject
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.subject)
    }
}
