//! Best-effort decoding of bearer credentials.
//!
//! DESIGN
//! ======
//! The client never verifies signatures; it only peeks at the payload to
//! learn who the user is and when the server will stop accepting the token.
//! Every field is extracted on its own so one malformed claim does not hide
//! the others, and any structural failure yields `None` instead of an error.

#[cfg(test)]
#[path = "claims_test.rs"]
mod claims_test;

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// Opaque signed token string as issued by `/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token. Blank input is not a credential.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload. Returns `None` for anything that is not a JWT.
    pub fn claims(&self) -> Option<Claims> {
        decode_claims(&self.0)
    }

    /// A credential is expired only when it decodes and carries an `exp`
    /// at or before `now_secs`.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.claims().is_some_and(|c| c.is_expired_at(now_secs))
    }
}

/// User identifier from the `id` claim; numeric ids are kept as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role as reported by the server.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Organizer,
    Player,
    Other(String),
}

impl Role {
    /// Parse a role string. Blank input is not a role.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "organizer" => Some(Self::Organizer),
            "player" => Some(Self::Player),
            other => Some(Self::Other(other.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Organizer => "organizer",
            Self::Player => "player",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded credential payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Claims {
    pub id: Option<UserId>,
    pub role: Option<Role>,
    /// Expiry in unix seconds. `None` means the client never expires it.
    pub exp: Option<i64>,
}

impl Claims {
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_secs)
    }
}

/// Decode the payload segment of a JWT-shaped token.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.trim().split('.').nth(1)?;
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(normalized) else {
        return None;
    };
    let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(&bytes) else {
        return None;
    };

    Some(Claims {
        id: object.get("id").and_then(UserId::from_json),
        role: object.get("role").and_then(Value::as_str).and_then(Role::parse),
        exp: object.get("exp").and_then(exp_seconds),
    })
}

/// Zero or negative expiries are treated as absent.
#[allow(clippy::cast_possible_truncation)]
fn exp_seconds(value: &Value) -> Option<i64> {
    let secs = match value.as_i64() {
        Some(secs) => secs,
        None => value.as_f64().filter(|f| f.is_finite())?.floor() as i64,
    };
    (secs > 0).then_some(secs)
}
