//! In-process store used by tests and database-less runs

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{PostQuery, PostStore, StoreResult, UserStore};
use crate::{
    identity::{IdAssigner, ResourceId},
    models::{NewPost, NewUser, Post, User},
};

#[derive(Default)]
struct Collections {
    users: HashMap<ResourceId, User>,
    posts: HashMap<ResourceId, Post>,
}

/// Memory-backed store for users and posts
#[derive(Clone, Default)]
pub struct MemoryStore {
    ids: Arc<IdAssigner>,
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<ResourceId> {
        new_user.validate()?;

        let mut collections = self.collections.write().await;
        let id = self.ids.assign();
        collections.users.insert(id, User::from_new(id, new_user));

        info!("Created user {}", id);
        Ok(id)
    }

    async fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<User>> {
        Ok(self.collections.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create(&self, new_post: NewPost) -> StoreResult<ResourceId> {
        new_post.validate()?;

        let mut collections = self.collections.write().await;
        let id = self.ids.assign();
        collections.posts.insert(id, Post::from_new(id, new_post));

        info!("Created post {}", id);
        Ok(id)
    }

    async fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<Post>> {
        Ok(self.collections.read().await.posts.get(&id).cloned())
    }

    async fn query(&self, query: &PostQuery) -> StoreResult<Vec<Post>> {
        let collections = self.collections.read().await;

        let mut posts: Vec<Post> = collections
            .posts
            .values()
            .filter(|post| query.admits(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.position().cmp(&a.position()));
        posts.truncate(query.limit as usize);

        debug!(
            "Post query for author {} returned {} rows",
            query.author_id,
            posts.len()
        );
        Ok(posts)
    }
}
