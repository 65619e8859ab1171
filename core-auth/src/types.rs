use bridge_traits::http::{basic_auth_value, HttpRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a logical token requester (a screen, a subsystem).
///
/// The key only groups pending continuations; it says nothing about whether the
/// requester is still alive. Continuations registered under a key are delivered
/// even after the requester has gone away.
///
/// # Examples
///
/// ```
/// use core_auth::RequesterKey;
///
/// let quotes_screen = RequesterKey::new();
/// let parsed = RequesterKey::from_string("550e8400-e29b-41d4-a716-446655440000").unwrap();
/// assert_ne!(quotes_screen, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequesterKey(Uuid);

impl RequesterKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequesterKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequesterKey {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Email/password pair sent as `Authorization: Basic ...` on every
/// authenticated request.
///
/// Immutable once built. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredential {
    email: String,
    password: String,
}

impl BasicCredential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Full `Authorization` header value.
    pub fn header_value(&self) -> String {
        basic_auth_value(&self.email, &self.password)
    }

    /// Attach this credential to `request`.
    pub fn apply(&self, request: HttpRequest) -> HttpRequest {
        request.basic_auth(&self.email, &self.password)
    }
}

impl fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Signed-in identity returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Fields collected by the registration surface.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl RegistrationForm {
    pub fn credential(&self) -> BasicCredential {
        BasicCredential::new(&self.email, &self.password)
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// The cached credential and the identity it resolved to.
///
/// Replaced as a whole; never partially updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: BasicCredential,
    pub user: User,
}

/// Observable state of the [`AuthGate`](crate::AuthGate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    /// No cached session and nobody waiting.
    NoSession,
    /// A session is cached; token requests complete without any UI.
    SessionCached,
    /// The sign-in surface is up and requesters are queued behind it.
    SignInInFlight,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::NoSession => write!(f, "no session"),
            GateState::SessionCached => write!(f, "session cached"),
            GateState::SignInInFlight => write!(f, "sign-in in flight"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::http::HttpMethod;

    #[test]
    fn test_requester_key_round_trip_through_string() {
        let key = RequesterKey::new();
        let parsed = RequesterKey::from_string(&key.to_string()).unwrap();
        assert_eq!(key, parsed);
        assert!(RequesterKey::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_credential_debug_hides_password() {
        let credential = BasicCredential::new("a@b.com", "hunter2");
        let debug = format!("{:?}", credential);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credential_applies_basic_header() {
        let credential = BasicCredential::new("a@b.com", "pw");
        assert_eq!(credential.header_value(), "Basic YUBiLmNvbTpwdw==");

        let request = credential.apply(HttpRequest::new(HttpMethod::Get, "https://example.com"));
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Basic YUBiLmNvbTpwdw==".to_string())
        );
    }

    #[test]
    fn test_user_decodes_snake_case_json() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"email":"a@b.com","first_name":"Ann","last_name":"Bee","phone_number":"555"}"#,
        )
        .unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.first_name, "Ann");
    }

    #[test]
    fn test_registration_form_serializes_all_fields() {
        let form = RegistrationForm {
            email: "a@b.com".into(),
            password: "pw".into(),
            first_name: "Ann".into(),
            last_name: "Bee".into(),
            phone_number: "555".into(),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["password"], "pw");
        assert_eq!(json["phone_number"], "555");
        assert!(!format!("{:?}", form).contains("\"pw\""));
        assert_eq!(form.credential(), BasicCredential::new("a@b.com", "pw"));
    }
}
