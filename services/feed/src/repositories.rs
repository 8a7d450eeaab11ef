//! Repositories for persisting users and posts
//!
//! Two backends implement the same traits: [`postgres`] for deployments and
//! [`memory`] for tests and database-less runs. Handlers only ever see the
//! trait objects held in [`crate::state::AppState`].

use async_trait::async_trait;
use common::error::DatabaseError;
use thiserror::Error;

use crate::{
    identity::ResourceId,
    models::{NewPost, NewUser, Post, User, ValidationError},
    pagination::FeedPosition,
};

pub mod memory;
pub mod postgres;

/// Failure at the store boundary
#[derive(Error, Debug)]
pub enum StoreError {
    /// The record is missing required fields; nothing was written
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backing database failed
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;

/// Filter, order and limit for reading one author's posts
///
/// Results are ordered newest first by `created_at`, ties broken by
/// descending `id`. When `after` is set only posts strictly past that
/// position in this order are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub author_id: ResourceId,
    pub after: Option<FeedPosition>,
    pub limit: u32,
}

impl PostQuery {
    /// Whether `post` passes this query's filter
    pub fn admits(&self, post: &Post) -> bool {
        if post.author_id != self.author_id {
            return false;
        }

        match &self.after {
            Some(after) => post.position() < *after,
            None => true,
        }
    }
}

/// Persistence for users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user and return its assigned id
    async fn create(&self, new_user: NewUser) -> StoreResult<ResourceId>;

    /// Find a user by id; `None` when no such user exists
    async fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<User>>;
}

/// Persistence for posts
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a new post and return its assigned id
    async fn create(&self, new_post: NewPost) -> StoreResult<ResourceId>;

    /// Find a post by id; `None` when no such post exists
    async fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<Post>>;

    /// Run a filtered, ordered, limited read over posts
    async fn query(&self, query: &PostQuery) -> StoreResult<Vec<Post>>;
}
