//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    pagination::FeedPaginator,
    repositories::{PostStore, UserStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub paginator: FeedPaginator,
}
