//! Пользователь и сессия

use serde::{Deserialize, Serialize};

/// Роль пользователя
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "moderator")]
    Admin,
    #[serde(alias = "creator")]
    User,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Профиль пользователя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub login: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Модератор может завершать и отклонять заявки и фильтровать по автору
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Тело запроса входа
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Ответ на вход
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_aliases_and_unknown_values() {
        let user: User = serde_json::from_str(r#"{"login": "boss", "role": "moderator"}"#).unwrap();
        assert!(user.is_admin());

        let user: User = serde_json::from_str(r#"{"login": "ann", "role": "guest"}"#).unwrap();
        assert_eq!(user.role, Role::Unknown);
        assert!(!user.is_admin());

        let user: User = serde_json::from_str(r#"{"login": "bob"}"#).unwrap();
        assert_eq!(user.role, Role::Unknown);
    }

    #[test]
    fn login_response_accepts_access_token_field() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"access_token": "abc", "user": {"login": "ann", "role": "user"}}"#)
                .unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.unwrap().role, Role::User);
    }
}
