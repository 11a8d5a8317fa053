//! CORS policy configuration

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{SecurityError, SecurityResult};

/// A set of allowed values, or everything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllowList {
    Any,
    Only(BTreeSet<String>),
}

impl Default for AllowList {
    fn default() -> Self {
        AllowList::Only(BTreeSet::new())
    }
}

impl AllowList {
    pub fn is_any(&self) -> bool {
        matches!(self, AllowList::Any)
    }

    /// `value` must already be normalized the way the list stores it
    pub fn allows(&self, value: &str) -> bool {
        match self {
            AllowList::Any => true,
            AllowList::Only(values) => values.contains(value),
        }
    }

    fn extend<I: IntoIterator<Item = String>>(&mut self, items: I) {
        match self {
            AllowList::Any => {}
            AllowList::Only(values) => values.extend(items),
        }
    }
}

/// Origins compare on lowercase scheme and host without a trailing slash
pub fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_lowercase()
}

/// Immutable cross-origin policy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorsPolicy {
    pub origins: AllowList,
    /// Upper-case method names
    pub methods: AllowList,
    /// Lower-case header names
    pub headers: AllowList,
    pub exposed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub preflight_max_age: Option<u32>,
}

impl CorsPolicy {
    pub fn builder() -> CorsPolicyBuilder {
        CorsPolicyBuilder::default()
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.origins.allows(&normalize_origin(origin))
    }

    pub fn is_method_allowed(&self, method: &str) -> bool {
        self.methods.allows(&method.trim().to_uppercase())
    }

    /// Check a comma-separated `Access-Control-Request-Headers` value
    pub fn are_headers_allowed(&self, requested: &str) -> bool {
        split_list(requested).all(|header| self.headers.allows(&header.to_lowercase()))
    }

    /// Responses depend on the request origin unless every origin gets `*`
    pub fn varies_by_origin(&self) -> bool {
        !self.origins.is_any() || self.allow_credentials
    }
}

pub(crate) fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Fluent builder; [`CorsPolicyBuilder::build`] validates the result
#[derive(Debug, Clone, Default)]
pub struct CorsPolicyBuilder {
    policy: CorsPolicy,
}

impl CorsPolicyBuilder {
    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.policy
            .origins
            .extend(origins.into_iter().map(|o| normalize_origin(o.as_ref())));
        self
    }

    pub fn allow_any_origin(mut self) -> Self {
        self.policy.origins = AllowList::Any;
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.policy
            .methods
            .extend(methods.into_iter().map(|m| m.as_ref().trim().to_uppercase()));
        self
    }

    pub fn allow_any_method(mut self) -> Self {
        self.policy.methods = AllowList::Any;
        self
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.policy
            .headers
            .extend(headers.into_iter().map(|h| h.as_ref().trim().to_lowercase()));
        self
    }

    pub fn allow_any_header(mut self) -> Self {
        self.policy.headers = AllowList::Any;
        self
    }

    pub fn with_exposed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.policy
            .exposed_headers
            .extend(headers.into_iter().map(|h| h.as_ref().trim().to_lowercase()));
        self
    }

    pub fn allow_credentials(mut self) -> Self {
        self.policy.allow_credentials = true;
        self
    }

    pub fn set_preflight_max_age(mut self, seconds: u32) -> Self {
        self.policy.preflight_max_age = Some(seconds);
        self
    }

    pub fn build(self) -> SecurityResult<CorsPolicy> {
        let policy = self.policy;
        if policy.allow_credentials && policy.origins.is_any() {
            return Err(SecurityError::config(
                "A CORS policy cannot allow any origin and credentials at the same time; list the origins explicitly",
            ));
        }
        if let AllowList::Only(origins) = &policy.origins {
            if let Some(bad) = origins.iter().find(|o| !o.starts_with("http://") && !o.starts_with("https://")) {
                return Err(SecurityError::config(format!(
                    "CORS origin '{}' must include the http:// or https:// scheme",
                    bad
                )));
            }
        }
        Ok(policy)
    }
}

/// Named CORS policies registered for the application
#[derive(Debug, Clone, Default)]
pub struct CorsOptions {
    policies: HashMap<String, CorsPolicy>,
}

impl CorsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and store a policy; a later policy with the same name replaces
    /// the earlier one
    pub fn add_policy<F>(&mut self, name: &str, configure: F) -> SecurityResult<&mut Self>
    where
        F: FnOnce(CorsPolicyBuilder) -> CorsPolicyBuilder,
    {
        let policy = configure(CorsPolicy::builder()).build()?;
        tracing::debug!(policy = name, "CORS policy registered");
        self.policies.insert(name.to_string(), policy);
        Ok(self)
    }

    pub fn get_policy(&self, name: &str) -> SecurityResult<&CorsPolicy> {
        self.policies.get(name).ok_or_else(|| SecurityError::UnknownPolicy {
            name: name.to_string(),
        })
    }

    pub fn policy_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
