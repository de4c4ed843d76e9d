use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Username/password buffer filled in by the user interface.
///
/// Its contents are moved out when a login is dispatched, so the fields are
/// empty again before the server has answered.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }

    /// Move the credentials out, leaving both fields empty
    pub fn take(&mut self) -> LoginRequest {
        LoginRequest {
            username: std::mem::take(&mut self.username),
            password: std::mem::take(&mut self.password),
        }
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a request to the `login` endpoint.
#[derive(Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn to_body(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password,
        })
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Shape of a well-formed `login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginResponse {
    /// 1 when the credentials were accepted, 0 otherwise
    pub success: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// What a `login` response body means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    Accepted { token: String },
    Rejected,
    /// Neither a clear acceptance nor a clear rejection
    Malformed(String),
}

impl LoginReply {
    pub fn interpret(body: &Value) -> Self {
        let response: LoginResponse = match serde_json::from_value(body.clone()) {
            Ok(response) => response,
            Err(e) => return LoginReply::Malformed(e.to_string()),
        };

        match (response.success, response.token) {
            (1, Some(token)) if !token.is_empty() => LoginReply::Accepted { token },
            (1, _) => LoginReply::Malformed("success without a token".to_string()),
            (0, _) => LoginReply::Rejected,
            (other, _) => LoginReply::Malformed(format!("unexpected success value {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_form() {
        let mut form = LoginForm::new("alice", "secret");
        let request = form.take();

        assert!(form.is_empty());
        assert_eq!(request.username, "alice");
        assert_eq!(request.password, "secret");
        assert_eq!(
            request.to_body(),
            json!({"username": "alice", "password": "secret"})
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let form = LoginForm::new("alice", "hunter2");
        let printed = format!("{:?}", form);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));

        let request = LoginForm::new("alice", "hunter2").take();
        assert!(!format!("{:?}", request).contains("hunter2"));
    }

    #[test]
    fn test_interpret_accepted() {
        assert_eq!(
            LoginReply::interpret(&json!({"success": 1, "token": "abc"})),
            LoginReply::Accepted { token: "abc".to_string() }
        );
    }

    #[test]
    fn test_interpret_rejected() {
        assert_eq!(LoginReply::interpret(&json!({"success": 0})), LoginReply::Rejected);
        // A stray token on a rejection is ignored
        assert_eq!(
            LoginReply::interpret(&json!({"success": 0, "token": "abc"})),
            LoginReply::Rejected
        );
    }

    #[test]
    fn test_interpret_malformed() {
        let malformed = [
            json!({"success": 1}),
            json!({"success": 1, "token": ""}),
            json!({"success": 2}),
            json!({"success": "1", "token": "abc"}),
            json!({"success": true, "token": "abc"}),
            json!({"token": "abc"}),
            json!([]),
            json!(null),
        ];
        for body in malformed {
            assert!(
                matches!(LoginReply::interpret(&body), LoginReply::Malformed(_)),
                "expected malformed for {}",
                body
            );
        }
    }
}
