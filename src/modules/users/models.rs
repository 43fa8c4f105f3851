use bookshelf_db::{Entity, NewRecord, Patch};
use serde::{Deserialize, Serialize};

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "username", "password_hash", "email", "full_name"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
}

impl NewRecord for NewUser {
    type Entity = User;

    fn values(&self) -> Patch {
        Patch::new()
            .eq("username", self.username.as_str())
            .eq("password_hash", self.password_hash.as_str())
            .eq("email", self.email.as_str())
            .eq("full_name", self.full_name.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Body of every register/login/logout response.
#[derive(Debug, Serialize)]
pub struct AuthOutcome {
    pub is_success: bool,
    pub message: String,
    #[serde(flatten)]
    pub profile: Option<ProfileFields>,
}

#[derive(Debug, Serialize)]
pub struct ProfileFields {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl AuthOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            profile: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            profile: None,
        }
    }

    pub fn signed_in(user: &User) -> Self {
        Self {
            is_success: true,
            message: "Login successful".to_string(),
            profile: Some(ProfileFields {
                username: user.username.clone(),
                email: user.email.clone(),
                full_name: user.full_name.clone(),
            }),
        }
    }
}
