/// Access rule attached to an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthorizationRequirement {
    #[default]
    Anonymous,
    Authenticated,
    /// Authenticated and in at least one of the roles
    Roles(Vec<String>),
}

impl AuthorizationRequirement {
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthorizationRequirement::Roles(roles.into_iter().map(Into::into).collect())
    }

    pub fn requires_authentication(&self) -> bool {
        !matches!(self, AuthorizationRequirement::Anonymous)
    }

    pub fn required_roles(&self) -> &[String] {
        match self {
            AuthorizationRequirement::Roles(roles) => roles,
            _ => &[],
        }
    }
}

/// Descriptive data about an endpoint, read by authorization and the API
/// explorer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointMetadata {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub authorization: AuthorizationRequirement,
}
