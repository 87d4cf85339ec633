use chrono::Utc;
use mongodb::bson::{self, doc};
use mongodb::{Client, Collection};

use crate::error::Result;
use crate::models::{Profile, ThreadBinding};

#[derive(Clone)]
pub struct MongoProfileRepository {
    collection: Collection<Profile>,
}

impl MongoProfileRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("profiles");
        Self { collection }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.collection.find_one(doc! { "id": user_id }).await?)
    }

    /// Case-insensitive substring match on `full_name`
    pub async fn find_by_name(&self, fragment: &str) -> Result<Option<Profile>> {
        let filter = doc! {
            "full_name": { "$regex": regex::escape(fragment), "$options": "i" },
        };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Upsert the binding fields on the user's profile
    pub async fn save_binding(&self, binding: &ThreadBinding) -> Result<()> {
        let updated_at = bson::to_bson(&Utc::now())?;
        self.collection
            .update_one(
                doc! { "id": binding.user_id.as_str() },
                doc! {
                    "$set": {
                        "thread_id": binding.thread_id.as_str(),
                        "context_seeded": binding.context_seeded,
                        "thread_updated_at": updated_at,
                    }
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Compare-and-set `context_seeded` false → true on the bound thread
    pub async fn claim_seed(&self, user_id: &str, thread_id: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! {
                    "id": user_id,
                    "thread_id": thread_id,
                    "context_seeded": { "$ne": true },
                },
                doc! { "$set": { "context_seeded": true } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    pub async fn release_seed(&self, user_id: &str, thread_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "id": user_id, "thread_id": thread_id },
                doc! { "$set": { "context_seeded": false } },
            )
            .await?;
        Ok(())
    }
}
