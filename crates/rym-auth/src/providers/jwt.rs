//! JWT (JSON Web Token) bearer authentication

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rym_http::{Principal, RymRequest};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::JwtSettings;
use crate::traits::{extract_credentials, Authenticator};
use crate::{AuthError, AuthResult};

pub const BEARER_SCHEME: &str = "Bearer";

/// Claim names accepted for roles, in lookup order
const ROLE_CLAIMS: &[&str] = &[
    "role",
    "roles",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];

const NAME_CLAIMS: &[&str] = &[
    "name",
    "unique_name",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
];

/// A claim holding one value or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Validates HS256 bearer tokens against [`JwtSettings`]
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = settings.clock_skew_secs;
        match &settings.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(settings.key.as_bytes()),
            validation,
        }
    }

    /// Validate a raw token and turn its claims into a principal
    pub fn validate(&self, token: &str) -> AuthResult<Principal> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
        principal_from_claims(data.claims)
    }
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish()
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, request: &RymRequest) -> AuthResult<Option<Principal>> {
        match extract_credentials(request, BEARER_SCHEME) {
            Some(token) => self.validate(token).map(Some),
            None => Ok(None),
        }
    }

    fn scheme(&self) -> &'static str {
        BEARER_SCHEME
    }
}

fn principal_from_claims(claims: Map<String, Value>) -> AuthResult<Principal> {
    let subject = match claims.get("sub") {
        Some(Value::String(sub)) if !sub.is_empty() => sub.clone(),
        Some(Value::Number(sub)) => sub.to_string(),
        _ => return Err(AuthError::token_error("The 'sub' claim is missing")),
    };

    let mut principal = Principal::new(subject, BEARER_SCHEME);
    if let Some(name) = NAME_CLAIMS.iter().find_map(|claim| claims.get(*claim)?.as_str()) {
        principal = principal.with_name(name);
    }

    for claim in ROLE_CLAIMS {
        let Some(value) = claims.get(*claim) else {
            continue;
        };
        match serde_json::from_value::<OneOrMany>(value.clone()) {
            Ok(OneOrMany::One(role)) => principal = principal.with_role(role),
            Ok(OneOrMany::Many(roles)) => {
                for role in roles {
                    principal = principal.with_role(role);
                }
            }
            Err(_) => return Err(AuthError::token_error(format!("The '{}' claim is malformed", claim))),
        }
    }

    Ok(principal.with_claims(claims))
}
