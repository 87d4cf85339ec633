use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dbs::mongo::models::{MongoRecord, Timestamped};
use crate::error::Result;

/// Append-only collection of timestamped records
#[derive(Clone)]
pub struct MongoRecordRepository<T>
where
    T: Send + Sync,
{
    collection: Collection<MongoRecord<T>>,
}

impl<T> MongoRecordRepository<T>
where
    T: Timestamped + Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    pub fn new(client: &Client, db_name: &str, collection: &str) -> Self {
        let collection = client.database(db_name).collection(collection);
        Self { collection }
    }

    pub async fn insert(&self, record: T) -> Result<()> {
        let document: MongoRecord<T> = record.into();
        self.collection.insert_one(&document).await?;
        Ok(())
    }

    /// Records matching `filter`, newest first
    pub async fn latest(&self, filter: Document, limit: Option<i64>) -> Result<Vec<T>> {
        let mut find = self.collection.find(filter).sort(doc! { "recorded_at": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let documents: Vec<MongoRecord<T>> = find.await?.try_collect().await?;
        Ok(documents.into_iter().map(|d| d.record).collect())
    }

    /// Records of a user, newest first
    pub async fn latest_for_user(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<T>> {
        self.latest(doc! { "user_id": user_id }, limit).await
    }
}
