//! User profile table operations

use crate::db::{eq, DbScope};
use crate::errors::AppResult;
use crate::models::{KeyPairUpdate, ProfileUpsert, UserProfile};

const TABLE: &str = "user_profiles";

pub struct ProfileTable;

impl ProfileTable {
    pub async fn get(db: &DbScope<'_>, id: &str) -> AppResult<Option<UserProfile>> {
        let rows: Vec<UserProfile> = db
            .select(TABLE, &[("select", "*".to_string()), ("id", eq(id))])
            .await?;

        Ok(rows.into_iter().next())
    }

    /// Create the profile, or refresh email/name/picture when it exists
    pub async fn upsert(db: &DbScope<'_>, profile: &ProfileUpsert) -> AppResult<Option<UserProfile>> {
        let rows: Vec<UserProfile> = db.upsert(TABLE, "id", profile).await?;
        Ok(rows.into_iter().next())
    }

    /// Store the user's public key and wrapped private key
    pub async fn save_keys(db: &DbScope<'_>, id: &str, keys: &KeyPairUpdate) -> AppResult<Option<UserProfile>> {
        let rows: Vec<UserProfile> = db.update(TABLE, &[("id", eq(id))], keys).await?;
        Ok(rows.into_iter().next())
    }
}
