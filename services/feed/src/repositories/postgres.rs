//! PostgreSQL-backed repositories

use std::sync::Arc;

use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::{PgPool, Row, migrate::Migrator, postgres::PgRow};
use tracing::{debug, info};

use super::{PostQuery, PostStore, StoreResult, UserStore};
use crate::{
    credentials::CredentialDigest,
    identity::{IdAssigner, ResourceId},
    models::{NewPost, NewUser, Post, User},
};

/// Schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
    ids: Arc<IdAssigner>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool, ids: Arc<IdAssigner>) -> Self {
        Self { pool, ids }
    }

    fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            credential_digest: CredentialDigest::from_stored(row.try_get("p_hash")?),
        })
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: NewUser) -> StoreResult<ResourceId> {
        new_user.validate()?;
        let id = self.ids.assign();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, p_hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.credential_digest.as_str())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        info!("Created user {}", id);
        Ok(id)
    }

    async fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, p_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let user = row
            .as_ref()
            .map(Self::user_from_row)
            .transpose()
            .map_err(DatabaseError::Query)?;

        Ok(user)
    }
}

/// Post repository for database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
    ids: Arc<IdAssigner>,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool, ids: Arc<IdAssigner>) -> Self {
        Self { pool, ids }
    }

    fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            author_id: row.try_get("posted_by")?,
            caption: row.try_get("caption")?,
            image_url: row.try_get("img_url")?,
            created_at: row.try_get("posted_on")?,
        })
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn create(&self, new_post: NewPost) -> StoreResult<ResourceId> {
        new_post.validate()?;
        let id = self.ids.assign();

        sqlx::query(
            r#"
            INSERT INTO posts (id, posted_by, caption, img_url, posted_on)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(new_post.author_id)
        .bind(&new_post.caption)
        .bind(&new_post.image_url)
        .bind(new_post.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        info!("Created post {} by {}", id, new_post.author_id);
        Ok(id)
    }

    async fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, posted_by, caption, img_url, posted_on
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let post = row
            .as_ref()
            .map(Self::post_from_row)
            .transpose()
            .map_err(DatabaseError::Query)?;

        Ok(post)
    }

    async fn query(&self, query: &PostQuery) -> StoreResult<Vec<Post>> {
        let (after_time, after_id) = match &query.after {
            Some(position) => (Some(position.created_at), Some(position.id)),
            None => (None, None),
        };

        let rows = sqlx::query(
            r#"
            SELECT id, posted_by, caption, img_url, posted_on
            FROM posts
            WHERE posted_by = $1
              AND ($2::timestamptz IS NULL OR (posted_on, id) < ($2, $3))
            ORDER BY posted_on DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(query.author_id)
        .bind(after_time)
        .bind(after_id)
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        debug!(
            "Post query for author {} returned {} rows",
            query.author_id,
            rows.len()
        );

        let posts = rows
            .iter()
            .map(Self::post_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::Query)?;

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{credentials, pagination::FeedPosition};
    use chrono::{Duration, SubsecRound, Utc};
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn connect() -> PgPool {
        let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
        let pool = init_pool(&config).await.expect("database must be reachable");
        run_migrations(&pool, &MIGRATOR)
            .await
            .expect("migrations must apply");
        pool
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_user_roundtrip() {
        let pool = connect().await;
        let repository = UserRepository::new(pool, Arc::new(IdAssigner::new()));

        let id = repository
            .create(NewUser {
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                credential_digest: credentials::hash("p"),
            })
            .await
            .unwrap();

        let user = repository.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.credential_digest, credentials::hash("p"));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_query_breaks_timestamp_ties_by_id() {
        let pool = connect().await;
        let ids = Arc::new(IdAssigner::new());
        let repository = PostRepository::new(pool, ids.clone());
        let author = ids.assign();
        let shared = Utc::now().trunc_subsecs(6);

        let mut created = Vec::new();
        for offset in [0, 0, 0, -1] {
            let id = repository
                .create(NewPost {
                    author_id: author,
                    caption: "c".to_string(),
                    image_url: "u".to_string(),
                    created_at: shared + Duration::seconds(offset),
                })
                .await
                .unwrap();
            created.push(id);
        }

        let first = repository
            .query(&PostQuery {
                author_id: author,
                after: None,
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(first.iter().map(|p| p.id).collect::<Vec<_>>(), [created[2], created[1]]);

        let rest = repository
            .query(&PostQuery {
                author_id: author,
                after: Some(FeedPosition {
                    created_at: first[1].created_at,
                    id: first[1].id,
                }),
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(rest.iter().map(|p| p.id).collect::<Vec<_>>(), [created[0], created[3]]);
    }
}
