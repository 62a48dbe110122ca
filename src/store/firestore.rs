use crate::store::{BookmarkRecord, DocumentStore, SummaryRecord};
use crate::types::{article_key, Category, FetchConfig, NewsError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com/v1";

/// Firestore-backed document store, talking to the REST documents API with
/// the signed-in user's id token. One instance is scoped to one session.
///
/// Writes are plain PATCH/DELETE calls: last write wins, no preconditions.
pub struct FirestoreStore {
    client: Client,
    project_id: String,
    id_token: String,
}

impl FirestoreStore {
    pub fn new(project_id: String, id_token: String, config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            project_id,
            id_token,
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "{FIRESTORE_HOST}/projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn doc_url(&self, user_id: &str, collection: &str, article_url: &str) -> String {
        format!(
            "{}/users/{user_id}/{collection}/{}",
            self.documents_root(),
            article_key(article_url)
        )
    }

    async fn get_document(&self, url: &str) -> Result<Option<Value>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.id_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(NewsError::Store(format!("get failed ({status}): {body}")))
            }
        }
    }

    async fn set_document(&self, url: &str, fields: Value) -> Result<()> {
        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.id_token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Store(format!("set failed ({status}): {body}")));
        }
        Ok(())
    }

    async fn run_query(&self, user_id: &str, query: Value) -> Result<Vec<Value>> {
        let url = format!("{}/users/{user_id}:runQuery", self.documents_root());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.id_token)
            .json(&json!({ "structuredQuery": query }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Store(format!("query failed ({status}): {body}")));
        }

        let rows: Vec<Value> = response.json().await?;
        // Rows without a `document` key are progress/read-time markers.
        Ok(rows
            .into_iter()
            .filter_map(|row| row.get("document").cloned())
            .collect())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get_summary(&self, user_id: &str, article_url: &str) -> Result<Option<String>> {
        let url = self.doc_url(user_id, "summaries", article_url);
        let doc = self.get_document(&url).await?;
        Ok(doc
            .as_ref()
            .and_then(|d| d.get("fields"))
            .and_then(|fields| field_str(fields, "summary")))
    }

    async fn save_summary(&self, user_id: &str, record: &SummaryRecord) -> Result<()> {
        let url = self.doc_url(user_id, "summaries", &record.url);
        debug!("Saving summary for {} under user {}", record.url, user_id);
        self.set_document(&url, encode_summary(record)).await
    }

    async fn summaries_for_category(
        &self,
        user_id: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<SummaryRecord>> {
        let query = json!({
            "from": [{ "collectionId": "summaries" }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "category" },
                    "op": "EQUAL",
                    "value": { "stringValue": category.label() }
                }
            },
            "orderBy": [{
                "field": { "fieldPath": "created_at" },
                "direction": "DESCENDING"
            }],
            "limit": limit
        });

        let docs = self.run_query(user_id, query).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| doc.get("fields").and_then(decode_summary))
            .collect())
    }

    async fn save_bookmark(&self, user_id: &str, record: &BookmarkRecord) -> Result<()> {
        let url = self.doc_url(user_id, "bookmarks", &record.url);
        debug!("Saving bookmark for {} under user {}", record.url, user_id);
        self.set_document(&url, encode_bookmark(record)).await
    }

    async fn remove_bookmark(&self, user_id: &str, article_url: &str) -> Result<()> {
        let url = self.doc_url(user_id, "bookmarks", article_url);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.id_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Store(format!("delete failed ({status}): {body}")));
        }
        Ok(())
    }

    async fn is_bookmarked(&self, user_id: &str, article_url: &str) -> Result<bool> {
        let url = self.doc_url(user_id, "bookmarks", article_url);
        Ok(self.get_document(&url).await?.is_some())
    }

    async fn bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>> {
        let query = json!({
            "from": [{ "collectionId": "bookmarks" }],
            "orderBy": [{
                "field": { "fieldPath": "saved_at" },
                "direction": "DESCENDING"
            }]
        });

        let docs = self.run_query(user_id, query).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| doc.get("fields").and_then(decode_bookmark))
            .collect())
    }
}

// --- Firestore field (de)serialization -------------------------------------

fn str_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

fn opt_str_value(s: &Option<String>) -> Value {
    match s {
        Some(s) => str_value(s),
        None => json!({ "nullValue": null }),
    }
}

fn ts_value(t: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

fn field_str(fields: &Value, name: &str) -> Option<String> {
    fields
        .get(name)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn field_ts(fields: &Value, name: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(name)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn encode_summary(record: &SummaryRecord) -> Value {
    json!({
        "url": str_value(&record.url),
        "title": str_value(&record.title),
        "summary": str_value(&record.summary),
        "category": str_value(&record.category),
        "source": str_value(&record.source),
        "published": str_value(&record.published),
        "image": opt_str_value(&record.image),
        "created_at": ts_value(&record.created_at),
    })
}

fn decode_summary(fields: &Value) -> Option<SummaryRecord> {
    Some(SummaryRecord {
        url: field_str(fields, "url")?,
        title: field_str(fields, "title").unwrap_or_default(),
        summary: field_str(fields, "summary")?,
        category: field_str(fields, "category").unwrap_or_default(),
        source: field_str(fields, "source").unwrap_or_default(),
        published: field_str(fields, "published").unwrap_or_default(),
        image: field_str(fields, "image"),
        created_at: field_ts(fields, "created_at").unwrap_or_else(Utc::now),
    })
}

fn encode_bookmark(record: &BookmarkRecord) -> Value {
    json!({
        "url": str_value(&record.url),
        "title": str_value(&record.title),
        "source": str_value(&record.source),
        "published": str_value(&record.published),
        "image": opt_str_value(&record.image),
        "summary": opt_str_value(&record.summary),
        "saved_at": ts_value(&record.saved_at),
    })
}

fn decode_bookmark(fields: &Value) -> Option<BookmarkRecord> {
    Some(BookmarkRecord {
        url: field_str(fields, "url")?,
        title: field_str(fields, "title").unwrap_or_default(),
        source: field_str(fields, "source").unwrap_or_default(),
        published: field_str(fields, "published").unwrap_or_default(),
        image: field_str(fields, "image"),
        summary: field_str(fields, "summary"),
        saved_at: field_ts(fields, "saved_at").unwrap_or_else(Utc::now),
    })
}
