use serde::de::DeserializeOwned;
use serde::Serialize;

use super::escape::{EscapePolicy, StrictFormatter};

/// Process-wide JSON conventions used by controllers for request and
/// response bodies.
///
/// Property names are fixed by the payload types themselves: wire types
/// carry `#[serde(rename_all = "camelCase")]`, so map keys and explicitly
/// renamed fields are written exactly as given. Date-only values go
/// through [`super::DateOnly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    pub escape_policy: EscapePolicy,
}

impl JsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_escape_policy(mut self, policy: EscapePolicy) -> Self {
        self.escape_policy = policy;
        self
    }

    pub fn to_vec<T: Serialize + ?Sized>(&self, data: &T) -> serde_json::Result<Vec<u8>> {
        match self.escape_policy {
            EscapePolicy::Relaxed => serde_json::to_vec(data),
            EscapePolicy::Strict => {
                let mut out = Vec::with_capacity(128);
                let mut serializer = serde_json::Serializer::with_formatter(&mut out, StrictFormatter);
                data.serialize(&mut serializer)?;
                Ok(out)
            }
        }
    }

    pub fn to_string<T: Serialize + ?Sized>(&self, data: &T) -> serde_json::Result<String> {
        let bytes = self.to_vec(data)?;
        // Both formatters only ever write UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn from_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(bytes)
    }
}
