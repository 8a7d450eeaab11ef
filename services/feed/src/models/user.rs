//! User model and related payloads

use serde::{Deserialize, Serialize};

use super::{ValidationError, require};
use crate::{
    credentials::{self, CredentialDigest},
    identity::ResourceId,
};

/// Request for user registration
///
/// Carries the plaintext password; never log it.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CreateUserRequest {
    /// Validate the payload and hash its password
    pub fn into_new_user(self) -> Result<NewUser, ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)?;

        Ok(NewUser {
            name: self.name,
            email: self.email,
            credential_digest: credentials::hash(&self.password),
        })
    }
}

/// User ready to be persisted; the store assigns its id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub credential_digest: CredentialDigest,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", self.credential_digest.as_str())
    }
}

/// Stored user
#[derive(Debug, Clone)]
pub struct User {
    pub id: ResourceId,
    pub name: String,
    pub email: String,
    pub credential_digest: CredentialDigest,
}

impl User {
    pub fn from_new(id: ResourceId, new_user: NewUser) -> Self {
        Self {
            id,
            name: new_user.name,
            email: new_user.email,
            credential_digest: new_user.credential_digest,
        }
    }
}

/// Public view of a user, without credentials
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: ResourceId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
