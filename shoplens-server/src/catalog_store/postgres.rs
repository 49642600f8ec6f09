//! PostgreSQL implementation of the catalog store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use backoff::{future::retry_notify, ExponentialBackoff};
use shoplens_core::{CatalogEntry, CatalogError, CatalogStore, Identifier};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, instrument, warn};

/// Initial delay between connection attempts.
const INITIAL_INTERVAL: Duration = Duration::from_millis(250);

/// Maximum delay between connection attempts.
const MAX_INTERVAL: Duration = Duration::from_secs(5);

/// Give up connecting after this long.
const MAX_CONNECT_TIME: Duration = Duration::from_secs(30);

/// PostgreSQL-backed product catalog.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

/// Row type for database queries.
#[derive(FromRow)]
struct ProductRow {
    id: String,
    title: String,
    image: String,
    price: String,
    link: String,
    style: Option<String>,
    feature_vector: Vec<f64>,
}

impl From<ProductRow> for CatalogEntry {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            image: row.image,
            price: row.price,
            link: row.link,
            style: row.style,
            feature_vector: row.feature_vector,
        }
    }
}

impl PostgresCatalogStore {
    /// Connect to `database_url` and apply migrations.
    ///
    /// Connection attempts are retried with exponential backoff so the
    /// service can start before the database is up.
    #[instrument(
        level = "info",
        skip_all,
        fields(max_connections = max_connections, min_connections = min_connections)
    )]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, CatalogError> {
        let start = Instant::now();
        let backoff = ExponentialBackoff {
            initial_interval: INITIAL_INTERVAL,
            max_interval: MAX_INTERVAL,
            max_elapsed_time: Some(MAX_CONNECT_TIME),
            ..Default::default()
        };

        let pool = retry_notify(
            backoff,
            || async move {
                PgPoolOptions::new()
                    .max_connections(max_connections)
                    .min_connections(min_connections)
                    .connect(database_url)
                    .await
                    .map_err(|e| match e {
                        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_) => {
                            backoff::Error::transient(CatalogError::Connection(e.to_string()))
                        }
                        other => {
                            backoff::Error::permanent(CatalogError::Connection(other.to_string()))
                        }
                    })
            },
            |err: CatalogError, duration: Duration| {
                warn!(
                    error = %err,
                    retry_after_ms = duration.as_millis() as u64,
                    "Catalog connection failed, retry scheduled"
                );
            },
        )
        .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| CatalogError::Migration(e.to_string()))?;

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            "Catalog store connected and migrations applied"
        );

        Ok(Self { pool })
    }
}

fn query_error(e: sqlx::Error) -> CatalogError {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            CatalogError::Connection(e.to_string())
        }
        other => CatalogError::Query(other.to_string()),
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn find_by_ids(&self, ids: &[Identifier]) -> Result<Vec<CatalogEntry>, CatalogError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, title, image, price, link, style, feature_vector
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        debug!(requested = ids.len(), found = rows.len(), "Batched product lookup");

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_all(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, title, image, price, link, style, feature_vector
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, entry: &CatalogEntry) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, title, image, price, link, style, feature_vector)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                image = EXCLUDED.image,
                price = EXCLUDED.price,
                link = EXCLUDED.link,
                style = EXCLUDED.style,
                feature_vector = EXCLUDED.feature_vector
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.title)
        .bind(&entry.image)
        .bind(&entry.price)
        .bind(&entry.link)
        .bind(&entry.style)
        .bind(&entry.feature_vector)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        debug!(id = %entry.id, "Stored product");

        Ok(())
    }

    async fn clear(&self) -> Result<u64, CatalogError> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn check_health(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(())
    }
}
