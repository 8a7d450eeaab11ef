//! Domain records and their wire representations

use serde::Serialize;
use thiserror::Error;

use crate::identity::{IdError, ResourceId};

pub mod post;
pub mod user;

pub use post::{CreatePostRequest, NewPost, Post};
pub use user::{CreateUserRequest, NewUser, User, UserResponse};

/// A record failed its field checks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is malformed: {source}")]
    MalformedId {
        field: &'static str,
        #[source]
        source: IdError,
    },
}

/// Reject empty required strings
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

/// Response for create operations
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: ResourceId,
}
