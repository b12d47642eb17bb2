use bson::{Bson, doc};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Cursor};
use serde_json::Value;
use tracing::debug;

use super::CollectionRef;
use crate::error::StoreError;
use crate::node::Document;
use crate::pipeline::{DocumentSink, DocumentSource};

/// A `MongoDB` deployment.
///
/// Documents cross the boundary as canonical extended JSON, so every typed
/// scalar appears as a wrapper (`{"$oid": ...}`, `{"$numberLong": ...}`,
/// `{"$date": ...}`) and unmasked fields are written back with their original
/// BSON type.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Connect with a `mongodb://` or `mongodb+srv://` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is invalid or the deployment unreachable.
    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self { client })
    }

    fn collection(&self, collection: &CollectionRef) -> Collection<bson::Document> {
        self.client
            .database(&collection.database)
            .collection(&collection.collection)
    }

    /// Open a cursor over `collection` in natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn source(&self, collection: &CollectionRef) -> Result<MongoSource, StoreError> {
        debug!(%collection, "opening source collection");
        let handle = self.collection(collection);
        let cursor = handle.find(doc! {}).await?;
        Ok(MongoSource {
            collection: handle,
            cursor,
        })
    }

    /// Bulk insert into `collection`.
    #[must_use]
    pub fn sink(&self, collection: &CollectionRef) -> MongoSink {
        debug!(%collection, "opening target collection");
        MongoSink {
            collection: self.collection(collection),
        }
    }
}

/// A cursor over a collection.
#[derive(Debug)]
pub struct MongoSource {
    collection: Collection<bson::Document>,
    cursor: Cursor<bson::Document>,
}

impl DocumentSource for MongoSource {
    async fn count(&mut self) -> Result<u64, StoreError> {
        let count = self.collection.count_documents(doc! {}).await?;
        Ok(count)
    }

    async fn next_document(&mut self) -> Result<Option<Document>, StoreError> {
        let Some(document) = self.cursor.try_next().await? else {
            return Ok(None);
        };
        to_json(document).map(Some)
    }
}

/// Writes to a collection with `insertMany`.
#[derive(Debug)]
pub struct MongoSink {
    collection: Collection<bson::Document>,
}

impl DocumentSink for MongoSink {
    async fn insert_many(&mut self, documents: Vec<Document>) -> Result<(), StoreError> {
        let documents = documents
            .into_iter()
            .map(to_bson)
            .collect::<Result<Vec<_>, _>>()?;
        self.collection.insert_many(documents).await?;
        Ok(())
    }
}

fn to_json(document: bson::Document) -> Result<Document, StoreError> {
    match Bson::Document(document).into_canonical_extjson() {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::Bson {
            message: format!("expected a document, found {other}"),
        }),
    }
}

fn to_bson(document: Document) -> Result<bson::Document, StoreError> {
    let value = Bson::try_from(Value::Object(document)).map_err(|error| StoreError::Bson {
        message: error.to_string(),
    })?;
    match value {
        Bson::Document(document) => Ok(document),
        other => Err(StoreError::Bson {
            message: format!("expected a document, found {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_convert_typed_scalars_both_ways() {
        let original = doc! {
            "_id": bson::oid::ObjectId::parse_str("65d8a2f3e1b2c3d4e5f60718").expect("oid"),
            "name": "John",
            "visits": 3_i32,
        };

        let json = to_json(original.clone()).expect("to json");
        assert_eq!(json["_id"], json!({"$oid": "65d8a2f3e1b2c3d4e5f60718"}));
        assert_eq!(json["name"], json!("John"));
        assert_eq!(json["visits"], json!({"$numberInt": "3"}));

        let back = to_bson(json).expect("to bson");
        assert_eq!(back, original);
    }

    #[test]
    fn should_keep_numeric_types_of_unmasked_fields() {
        let original = doc! {
            "_id": 1_i32,
            "visits": 5_i64,
            "ratio": 2.0_f64,
            "scores": [7_i64, 1.5_f64],
        };

        let json = to_json(original.clone()).expect("to json");
        assert_eq!(json["visits"], json!({"$numberLong": "5"}));
        assert_eq!(json["ratio"], json!({"$numberDouble": "2.0"}));

        let back = to_bson(json).expect("to bson");
        assert_eq!(back.get("visits"), Some(&Bson::Int64(5)));
        assert_eq!(back.get("ratio"), Some(&Bson::Double(2.0)));
        assert_eq!(back, original);
    }

    #[test]
    fn should_convert_masked_dates() {
        let masked = json!({"assessmentDate": {"$date": "2001-05-17T00:00:00.000Z"}});
        let Value::Object(document) = masked else {
            unreachable!()
        };
        let converted = to_bson(document).expect("to bson");
        assert!(matches!(converted.get("assessmentDate"), Some(Bson::DateTime(_))));
    }
}
