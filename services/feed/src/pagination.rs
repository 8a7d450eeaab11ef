//! Keyset pagination over an author's posts, newest first
//!
//! A page is addressed by the `(created_at, id)` of the last post the client
//! saw. The next page holds the posts that sort strictly after it in
//! `created_at DESC, id DESC` order, so posts sharing a timestamp are split
//! by id instead of being skipped or repeated. Posts created after the walk
//! started sort before the cursor and never shift later pages.
//!
//! The server keeps no state between pages; everything needed to continue
//! travels in the [`FeedCursor`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    identity::{IdError, ResourceId},
    models::Post,
    repositories::{PostQuery, PostStore, StoreResult},
};

/// Sort key of a post inside its author's feed
///
/// Ordering compares `created_at` first, then `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeedPosition {
    pub created_at: DateTime<Utc>,
    pub id: ResourceId,
}

/// Cursor fields as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPageRequest {
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub last_posted_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub n_new: i64,
    #[serde(default)]
    pub first_request: bool,
}

/// The cursor fields do not describe a valid page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CursorError {
    #[error("{0} is required unless first_request is true")]
    MissingField(&'static str),

    #[error("last_id is malformed: {0}")]
    MalformedId(#[from] IdError),

    #[error("n_new must be between 1 and 4294967295, got {0}")]
    PageSize(i64),
}

/// Validated position and size of the page to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    /// Last post already seen; `None` for the first page
    pub position: Option<FeedPosition>,
    pub page_size: u32,
}

impl FeedCursor {
    /// Cursor for the newest `page_size` posts
    pub fn first(page_size: u32) -> Self {
        Self {
            position: None,
            page_size,
        }
    }

    /// Cursor continuing after `position`
    pub fn after(position: FeedPosition, page_size: u32) -> Self {
        Self {
            position: Some(position),
            page_size,
        }
    }
}

impl TryFrom<FeedPageRequest> for FeedCursor {
    type Error = CursorError;

    fn try_from(request: FeedPageRequest) -> Result<Self, Self::Error> {
        let page_size = u32::try_from(request.n_new)
            .ok()
            .filter(|size| *size > 0)
            .ok_or(CursorError::PageSize(request.n_new))?;

        if request.first_request {
            return Ok(Self::first(page_size));
        }

        let id = request
            .last_id
            .filter(|id| !id.is_empty())
            .ok_or(CursorError::MissingField("last_id"))?
            .parse::<ResourceId>()?;
        let created_at = request
            .last_posted_on
            .ok_or(CursorError::MissingField("last_posted_on"))?;

        Ok(Self::after(FeedPosition { created_at, id }, page_size))
    }
}

/// One page of an author's feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub posts: Vec<Post>,
}

impl FeedPage {
    /// Position to resume from, or `None` once the feed is exhausted
    pub fn next_position(&self) -> Option<FeedPosition> {
        self.posts.last().map(Post::position)
    }
}

/// Turns cursors into store queries
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedPaginator {
    max_page_size: Option<u32>,
}

impl FeedPaginator {
    /// `max_page_size` clamps client page sizes when set
    pub fn new(max_page_size: Option<u32>) -> Self {
        Self { max_page_size }
    }

    /// Build the query that fetches the page addressed by `cursor`
    pub fn build_query(&self, author_id: ResourceId, cursor: &FeedCursor) -> PostQuery {
        let limit = match self.max_page_size {
            Some(max) => cursor.page_size.min(max),
            None => cursor.page_size,
        };

        PostQuery {
            author_id,
            after: cursor.position,
            limit,
        }
    }

    /// Fetch the page addressed by `cursor`
    pub async fn next_page(
        &self,
        store: &dyn PostStore,
        author_id: ResourceId,
        cursor: &FeedCursor,
    ) -> StoreResult<FeedPage> {
        let query = self.build_query(author_id, cursor);
        debug!(?query, "Fetching feed page");

        let posts = store.query(&query).await?;
        Ok(FeedPage { posts })
    }
}
