use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc};
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoInsight;
use crate::error::Result;
use crate::models::ClinicalInsight;

#[derive(Clone)]
pub struct MongoInsightRepository {
    collection: Collection<MongoInsight>,
}

impl MongoInsightRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("clinical_insights");
        Self { collection }
    }

    /// Newest row whose expiry is after `now`; expired rows stay in place
    pub async fn find_valid(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<ClinicalInsight>> {
        let filter = doc! {
            "user_id": user_id,
            "valid_until": { "$gt": bson::DateTime::from_chrono(now) },
        };
        let found = self
            .collection
            .find_one(filter)
            .sort(doc! { "recorded_at": -1 })
            .await?;
        Ok(found.map(Into::into))
    }

    pub async fn insert(&self, insight: ClinicalInsight) -> Result<()> {
        let document: MongoInsight = insight.into();
        self.collection.insert_one(&document).await?;
        Ok(())
    }
}
