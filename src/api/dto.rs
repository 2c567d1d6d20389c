//! Data Transfer Objects
//!
//! Wire shapes for the login webhook and the example protected route.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A signed-in user as exchanged with the auth provider
///
/// `id` is the user's address. `did` is opaque: `None` when the provider
/// left it out, `Some(Value::Null)` when it sent `null`. Any other fields
/// the provider sends are kept in `attributes` and echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub did: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            did: None,
            attributes: Map::new(),
        }
    }

    /// Set a field on the user.
    ///
    /// `id` and `did` are routed to their typed fields so the serialized
    /// object never carries a duplicate key. A non-string `id` is ignored.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "id" => {
                if let Value::String(id) = value {
                    self.id = id;
                }
            }
            "did" => self.did = Some(value),
            _ => {
                self.attributes.insert(key, value);
            }
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A key that is present deserializes to `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Why a webhook body was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("request body is not valid JSON")]
    MalformedJson,

    #[error("`{0}` is missing")]
    Missing(&'static str),

    #[error("`{0}` is empty")]
    Empty(&'static str),

    #[error("`{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Body of `POST /spec/auth/success`
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEnvelope {
    pub user: User,
}

impl WebhookEnvelope {
    /// Parse and validate a raw request body.
    ///
    /// An empty body or a JSON `null` is treated as `{}`. Anything that is
    /// not an object with a `user` object carrying a non-empty string `id`
    /// is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        let value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice::<Value>(body).map_err(|_| PayloadError::MalformedJson)?
        };

        let mut root = match value {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => {
                return Err(PayloadError::WrongType {
                    field: "body",
                    expected: "an object",
                });
            }
        };

        let mut user = match root.remove("user") {
            None | Some(Value::Null) => return Err(PayloadError::Missing("user")),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(PayloadError::WrongType {
                    field: "user",
                    expected: "an object",
                });
            }
        };

        let id = match user.remove("id") {
            None | Some(Value::Null) => return Err(PayloadError::Missing("user.id")),
            Some(Value::String(id)) if id.is_empty() => {
                return Err(PayloadError::Empty("user.id"));
            }
            Some(Value::String(id)) => id,
            Some(_) => {
                return Err(PayloadError::WrongType {
                    field: "user.id",
                    expected: "a string",
                });
            }
        };

        let did = match user.remove("did") {
            None => None,
            Some(did @ (Value::Null | Value::Object(_))) => Some(did),
            Some(_) => {
                return Err(PayloadError::WrongType {
                    field: "user.did",
                    expected: "an object or null",
                });
            }
        };

        Ok(Self {
            user: User {
                id,
                did,
                attributes: user,
            },
        })
    }
}

/// Response of `POST /spec/auth/success`
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub user: User,
}

/// Response of `GET /my-route`
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
