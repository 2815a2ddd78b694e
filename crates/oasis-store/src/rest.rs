//! Hosted REST backend (PostgREST records + object storage).
//!
//! Records live under `{url}/rest/v1/{collection}` and blobs under
//! `{url}/storage/v1/object/{bucket}/{name}`. Every call is a single HTTP
//! request, so the backend's own commit is the unit of atomicity: a request
//! either returns the written row or an error, never a partial write.
//!
//! # Request conventions
//!
//! | Operation | Method | Notes |
//! |-----------|--------|-------|
//! | create | `POST` | `Prefer: return=representation`, single-object `Accept` |
//! | update | `PATCH` | `id=eq.{id}`, single-object `Accept` |
//! | delete | `DELETE` | `id=eq.{id}` |
//! | fetch | `GET` | `id=eq.{id}`, single-object `Accept` |
//! | query | `GET` | `Range` + `Prefer: count=exact`, total read from `Content-Range` |
//! | upload | `POST` | raw body to the storage API |

use oasis_types::{Bucket, Collection, Filter};
use reqwest::header::{ACCEPT, CONTENT_RANGE, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::query::{Record, RecordPage, RecordQuery};

/// `Accept` value asking PostgREST for exactly one object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for the hosted backend.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RestStore {
    /// Build a client from configuration. No request is made until first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL is empty or not a base URL
    /// or the key is empty, or [`StoreError::Http`] if the HTTP client cannot
    /// be built.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.url.is_empty() {
            return Err(StoreError::Config("store url is empty".to_owned()));
        }
        if config.api_key.is_empty() {
            return Err(StoreError::Config("store api key is empty".to_owned()));
        }
        let base_url = Url::parse(&config.url)
            .map_err(|e| StoreError::Config(format!("invalid store url `{}`: {e}", config.url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "store url `{}` cannot carry a path",
                config.url
            )));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        tracing::info!(url = %config.url, "Remote store client ready");
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, collection: Collection) -> Url {
        endpoint(&self.base_url, &["rest", "v1", collection.as_str()])
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Public URL a blob is served from once uploaded.
    pub fn public_url(&self, bucket: Bucket, name: &str) -> String {
        public_url(&self.base_url, bucket, name)
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Insert one record and return it as stored.
    pub async fn create_record(
        &self,
        collection: Collection,
        payload: &Value,
    ) -> Result<Record, StoreError> {
        let response = self
            .authed(self.client.post(self.table_url(collection)))
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(payload)
            .send()
            .await?;

        let response = check(response, "create").await?;
        Ok(response.json().await?)
    }

    /// Patch the record with `id` and return it as stored.
    pub async fn update_record(
        &self,
        collection: Collection,
        id: i64,
        payload: &Value,
    ) -> Result<Record, StoreError> {
        let response = self
            .authed(self.client.patch(self.table_url(collection)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(payload)
            .send()
            .await?;

        let response = check(response, "update").await?;
        Ok(response.json().await?)
    }

    /// Delete the record with `id`.
    pub async fn delete_record(&self, collection: Collection, id: i64) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.delete(self.table_url(collection)))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        check(response, "delete").await?;
        Ok(())
    }

    /// Read the record with `id`.
    pub async fn fetch_record(&self, collection: Collection, id: i64) -> Result<Record, StoreError> {
        let response = self
            .authed(self.client.get(self.table_url(collection)))
            .query(&[("select", "*".to_owned()), ("id", format!("eq.{id}"))])
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        // PostgREST answers 406 when a single-object read matches no rows.
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(StoreError::NotFound(format!("{collection}/{id}")));
        }
        let response = check(response, "fetch").await?;
        Ok(response.json().await?)
    }

    /// Read a filtered, sorted window of rows plus the exact matching count.
    pub async fn query_records(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<RecordPage, StoreError> {
        let mut request = self
            .authed(self.client.get(self.table_url(collection)))
            .query(&query_params(query))
            .header("Prefer", "count=exact");

        if let Some(range) = query.range {
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", range.from, range.to));
        }

        let response = request.send().await?;
        // PostgREST answers 416 when the range starts past the last row.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return past_end_page(response.headers());
        }

        let response = check(response, "query").await?;
        let count = content_range_total(response.headers());

        let rows: Vec<Record> = response.json().await?;
        let count = match count {
            Some(total) => total,
            None => u64::try_from(rows.len())
                .map_err(|e| StoreError::Malformed(format!("row count overflow: {e}")))?,
        };

        Ok(RecordPage { rows, count })
    }

    // =========================================================================
    // Blobs
    // =========================================================================

    /// Upload `bytes` as `name` into `bucket`. Fails if the name is taken.
    pub async fn upload_blob(
        &self,
        bucket: Bucket,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.post(upload_url(&self.base_url, bucket, name)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes.to_vec())
            .send()
            .await?;

        check(response, "upload").await?;
        Ok(())
    }
}

/// `base` with `segments` appended, each percent-encoded as a single path
/// segment. `?`, `#`, `/` and spaces in a segment stay part of it.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // `connect` rejects cannot-be-a-base URLs, so this always applies.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Storage API endpoint that receives the bytes of `name`.
fn upload_url(base: &Url, bucket: Bucket, name: &str) -> Url {
    endpoint(base, &["storage", "v1", "object", bucket.as_str(), name])
}

/// Public URL a blob named `name` is served from. Encodes `name` exactly as
/// the upload does, so both address the same object.
pub fn public_url(base: &Url, bucket: Bucket, name: &str) -> String {
    endpoint(
        base,
        &["storage", "v1", "object", "public", bucket.as_str(), name],
    )
    .into()
}

/// Translate a [`RecordQuery`] into PostgREST query parameters.
fn query_params(query: &RecordQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), "*".to_owned())];

    if let Filter::Equals { field, value } = &query.filter {
        params.push((field.clone(), format!("eq.{value}")));
    }
    if let Some(sort) = &query.sort {
        params.push((
            "order".to_owned(),
            format!("{}.{}", sort.field, sort.direction.as_str()),
        ));
    }

    params
}

/// Total row count carried by the `Content-Range` header, if any.
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}

/// Empty window for a range past the end. The total still comes from
/// `Content-Range` (`*/45`).
fn past_end_page(headers: &HeaderMap) -> Result<RecordPage, StoreError> {
    let count = content_range_total(headers).ok_or_else(|| {
        StoreError::Malformed("range past the end without a total count".to_owned())
    })?;
    Ok(RecordPage {
        rows: Vec::new(),
        count,
    })
}

/// Parse the total from a `Content-Range` header (`0-9/42` or `*/0`).
fn parse_content_range_total(header: &str) -> Option<u64> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}

/// Turn a non-success response into [`StoreError::Rejected`].
async fn check(response: Response, operation: &'static str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());

    Err(StoreError::Rejected {
        operation,
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull the human-readable message out of a backend error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.to_owned())
}
