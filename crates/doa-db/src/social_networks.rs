//! Database operations for `social_networks`.
//!
//! The scraping subsystem never inserts or deletes rows here; it reads the
//! link list and writes back follower counts and the last error.

use chrono::{DateTime, Utc};
use doa_core::{CoreError, FollowerStore, FollowerUpdate, Platform, SocialNetworkRecord};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `social_networks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SocialNetworkRow {
    pub id: i64,
    pub profile_id: i64,
    pub platform: String,
    pub url: String,
    pub username: String,
    pub display_order: i32,
    pub followers: Option<i64>,
    pub followers_updated_at: Option<DateTime<Utc>>,
    pub update_error: Option<String>,
}

impl SocialNetworkRow {
    /// Converts the raw row into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPlatform`] if the stored platform name is
    /// not recognised.
    pub fn into_record(self) -> Result<SocialNetworkRecord, CoreError> {
        let platform = self.platform.parse::<Platform>()?;
        Ok(SocialNetworkRecord {
            id: self.id,
            platform,
            url: self.url,
            username: self.username,
            followers: self.followers,
            followers_updated_at: self.followers_updated_at,
            update_error: self.update_error,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, profile_id, platform, url, username, display_order, \
                              followers, followers_updated_at, update_error \
                              FROM social_networks";

/// Lists every social-network link, ordered by owning profile and then
/// display order. Rows with an unrecognised platform are logged and dropped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_social_networks_for_update(
    pool: &PgPool,
) -> Result<Vec<SocialNetworkRecord>, DbError> {
    let rows = sqlx::query_as::<_, SocialNetworkRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY profile_id, display_order, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(into_records(rows))
}

/// Lists the links of a single platform in the same order as
/// [`list_social_networks_for_update`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_social_networks_by_platform(
    pool: &PgPool,
    platform: Platform,
) -> Result<Vec<SocialNetworkRecord>, DbError> {
    let rows = sqlx::query_as::<_, SocialNetworkRow>(&format!(
        "{SELECT_COLUMNS} WHERE platform = $1 ORDER BY profile_id, display_order, id"
    ))
    .bind(platform.as_str())
    .fetch_all(pool)
    .await?;

    Ok(into_records(rows))
}

fn into_records(rows: Vec<SocialNetworkRow>) -> Vec<SocialNetworkRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(id, error = %e, "skipping social network with unknown platform");
                    None
                }
            }
        })
        .collect()
}

/// Writes the outcome of one extraction to its row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`] if
/// the update fails.
pub async fn record_follower_update(
    pool: &PgPool,
    id: i64,
    update: &FollowerUpdate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE social_networks \
         SET followers = $1, followers_updated_at = $2, update_error = $3 \
         WHERE id = $4",
    )
    .bind(update.followers)
    .bind(update.updated_at)
    .bind(update.error.as_deref())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// [`FollowerStore`] backed by the Postgres pool.
#[derive(Debug, Clone)]
pub struct PgFollowerStore {
    pool: PgPool,
}

impl PgFollowerStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl FollowerStore for PgFollowerStore {
    type Error = DbError;

    async fn save_follower_update(&self, id: i64, update: &FollowerUpdate) -> Result<(), DbError> {
        record_follower_update(&self.pool, id, update).await
    }
}
