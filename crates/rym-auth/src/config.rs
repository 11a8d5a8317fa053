//! Bearer token validation settings

use rym_core::{ConfigError, Configuration};

/// HS256 needs at least 256 bits of key material
pub const MIN_KEY_LENGTH: usize = 32;

/// Token validation settings, read from the `jwt` section
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSettings {
    /// Shared HS256 signing secret
    pub key: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Tolerated clock difference for `exp`/`nbf`
    pub clock_skew_secs: u64,
}

impl JwtSettings {
    pub const SECTION: &'static str = "jwt";

    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            issuer: None,
            audience: None,
            clock_skew_secs: 60,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigError> {
        let key = configuration
            .require("jwt:key", "set RYM__JWT__KEY or jwt.key in appsettings")?
            .to_string();
        if key.len() < MIN_KEY_LENGTH {
            return Err(ConfigError::invalid_value(
                "jwt:key",
                "<redacted>",
                format!("a secret of at least {} bytes", MIN_KEY_LENGTH),
            ));
        }

        let section = configuration.section(Self::SECTION);
        let non_empty = |name: &str| {
            section
                .get(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            key,
            issuer: non_empty("issuer"),
            audience: non_empty("audience"),
            clock_skew_secs: section.get_parsed("clock_skew_secs")?.unwrap_or(60),
        })
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .finish()
    }
}
