//! Post model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, require};
use crate::{identity::ResourceId, pagination::FeedPosition};

/// Request for post creation
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub posted_by: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub img_url: String,
}

impl CreatePostRequest {
    /// Validate the payload and stamp it with the server-side creation time
    pub fn into_new_post(self, created_at: DateTime<Utc>) -> Result<NewPost, ValidationError> {
        require("posted_by", &self.posted_by)?;
        require("caption", &self.caption)?;
        require("img_url", &self.img_url)?;

        let author_id: ResourceId = self
            .posted_by
            .parse()
            .map_err(|source| ValidationError::MalformedId {
                field: "posted_by",
                source,
            })?;

        Ok(NewPost {
            author_id,
            caption: self.caption,
            image_url: self.img_url,
            created_at,
        })
    }
}

/// Post ready to be persisted; the store assigns its id
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: ResourceId,
    pub caption: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("caption", &self.caption)?;
        require("img_url", &self.image_url)
    }
}

/// Stored post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: ResourceId,
    #[serde(rename = "posted_by")]
    pub author_id: ResourceId,
    pub caption: String,
    #[serde(rename = "img_url")]
    pub image_url: String,
    #[serde(rename = "posted_on")]
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn from_new(id: ResourceId, new_post: NewPost) -> Self {
        Self {
            id,
            author_id: new_post.author_id,
            caption: new_post.caption,
            image_url: new_post.image_url,
            created_at: new_post.created_at,
        }
    }

    /// Where this post sits in its author's feed
    pub fn position(&self) -> FeedPosition {
        FeedPosition {
            created_at: self.created_at,
            id: self.id,
        }
    }
}
