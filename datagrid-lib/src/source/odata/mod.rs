//! Remote OData data source.

mod batch;
mod response;

pub use batch::*;
pub use response::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::OnceCell;
use url::Url;

use super::Changes;
use super::DataSource;
use super::Protocol;
use crate::error::ConfigError;
use crate::error::SourceError;
use crate::model::Record;
use crate::model::Value;
use crate::query::DataResult;
use crate::query::Query;
use crate::query::compute_aggregates;
use crate::query::odata::key_to_odata;
use crate::query::odata::query_string;

/// A data source backed by an OData v3 or v4 service.
///
/// Cheap to clone (uses `Arc` internally). The service root is checked once,
/// on the first [`ready`](DataSource::ready) call.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::source::{ODataSource, Protocol};
///
/// let source = ODataSource::builder()
///     .url("https://services.odata.org/V4/Northwind/Northwind.svc")
///     .protocol(Protocol::ODataV4)
///     .table("Orders")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct ODataSource {
    inner: Arc<ODataSourceInner>,
}

struct ODataSourceInner {
    base_url: String,
    protocol: Protocol,
    table: Option<String>,
    http_client: Client,
    timeout: Option<Duration>,
    check_ready: bool,
    ready: OnceCell<()>,
}

impl std::fmt::Debug for ODataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataSource")
            .field("base_url", &self.inner.base_url)
            .field("protocol", &self.inner.protocol)
            .field("table", &self.inner.table)
            .finish()
    }
}

impl ODataSource {
    /// Creates a new builder for constructing a source.
    pub fn builder() -> ODataSourceBuilder<Missing> {
        ODataSourceBuilder::new()
    }

    /// Returns the service root URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the default table, if set.
    pub fn table(&self) -> Option<&str> {
        self.inner.table.as_deref()
    }

    /// Absolute URL of the entity set for `table` (or the default table).
    pub fn collection_url(&self, table: Option<&str>) -> Result<String, SourceError> {
        let table = table
            .or(self.inner.table.as_deref())
            .ok_or(SourceError::NoTable)?;
        Ok(format!("{}/{}", self.inner.base_url, table))
    }

    /// Absolute URL of one entity.
    pub fn entity_url(&self, table: Option<&str>, key: &Value) -> Result<String, SourceError> {
        Ok(format!(
            "{}({})",
            self.collection_url(table)?,
            key_to_odata(key, self.inner.protocol)
        ))
    }

    /// Full request URL for a query.
    pub fn query_url(&self, query: &Query) -> Result<String, SourceError> {
        let collection = self.collection_url(query.table())?;
        let params = query_string(query, self.inner.protocol)?;
        if params.is_empty() {
            Ok(collection)
        } else {
            Ok(format!("{}?{}", collection, params))
        }
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<(String, String)>,
    ) -> Result<reqwest::Response, SourceError> {
        let mut request = self
            .inner
            .http_client
            .request(method.clone(), url)
            .header(ACCEPT, "application/json");

        request = match self.inner.protocol {
            Protocol::OData => request
                .header("DataServiceVersion", "3.0")
                .header("MaxDataServiceVersion", "3.0"),
            _ => request
                .header("OData-Version", "4.0")
                .header("OData-MaxVersion", "4.0"),
        };

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some((content_type, body)) = body {
            request = request.header(CONTENT_TYPE, content_type).body(body);
        }

        log::debug!("[odata] {} {}", method, url);
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            log::warn!("[odata] {} {} failed with {}", method, url, status);
            Err(SourceError::http(status, body))
        }
    }

    async fn json(response: reqwest::Response) -> Result<serde_json::Value, SourceError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SourceError::parse_with_body(e.to_string(), text))
    }
}

#[async_trait]
impl DataSource for ODataSource {
    fn protocol(&self) -> Protocol {
        self.inner.protocol
    }

    async fn ready(&self) -> Result<(), SourceError> {
        if !self.inner.check_ready {
            return Ok(());
        }
        self.inner
            .ready
            .get_or_try_init(|| async {
                self.request(Method::GET, &self.inner.base_url, None)
                    .await
                    .map(|_| ())
                    .map_err(|e| SourceError::NotReady(e.to_string()))
            })
            .await
            .map(|_| ())
    }

    async fn execute_query(&self, query: &Query) -> Result<DataResult, SourceError> {
        let url = self.query_url(query)?;
        let response = self.request(Method::GET, &url, None).await?;
        let (records, count) = parse_collection(Self::json(response).await?)?;

        let aggregates = match aggregate_query(query) {
            Some(unpaged) => {
                let url = self.query_url(&unpaged)?;
                let response = self.request(Method::GET, &url, None).await?;
                let (all, _) = parse_collection(Self::json(response).await?)?;
                log::debug!("[odata] aggregates over {} records", all.len());
                compute_aggregates(query, &all)
            }
            None => compute_aggregates(query, &records),
        };
        Ok(DataResult {
            count: count.unwrap_or(records.len()),
            result: records,
            aggregates,
        })
    }

    async fn insert(&self, record: Record, _index: usize, table: Option<&str>) -> Result<Record, SourceError> {
        let url = self.collection_url(table)?;
        let body = record.to_json().to_string();
        let response = self
            .request(Method::POST, &url, Some(("application/json".to_string(), body)))
            .await?;

        // 204 No Content: the service stored the record as sent.
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(record);
        }
        parse_entity(Self::json(response).await?)
    }

    async fn update(&self, key_field: &str, record: Record, table: Option<&str>) -> Result<Record, SourceError> {
        let key = record.get(key_field);
        if key.is_null() {
            return Err(SourceError::not_found(key_field, "null"));
        }
        let url = self.entity_url(table, key)?;
        let body = record.to_json().to_string();
        self.request(Method::PATCH, &url, Some(("application/json".to_string(), body)))
            .await?;
        Ok(record)
    }

    async fn remove(&self, key_field: &str, key: &Value, table: Option<&str>) -> Result<(), SourceError> {
        let url = self.entity_url(table, key)?;
        self.request(Method::DELETE, &url, None).await?;
        log::debug!("[odata] removed {} = {}", key_field, key);
        Ok(())
    }

    async fn save_changes(&self, changes: Changes, key_field: &str, table: Option<&str>) -> Result<Changes, SourceError> {
        let collection = self.collection_url(table)?;
        let batch_boundary = generate_boundary("batch");
        let changeset_boundary = generate_boundary("changeset");
        let body = build_changeset_body(
            &changes,
            key_field,
            &collection,
            self.inner.protocol,
            &batch_boundary,
            &changeset_boundary,
        );

        let url = format!("{}/$batch", self.inner.base_url);
        let content_type = format!("multipart/mixed; boundary={}", batch_boundary);
        let response = self
            .request(Method::POST, &url, Some((content_type, body)))
            .await?;
        let text = response.text().await?;

        let statuses = parse_batch_statuses(&text);
        if let Some(status) = statuses.iter().find(|s| !(200..300).contains(*s)) {
            return Err(SourceError::http(*status, text));
        }
        log::debug!("[odata] batch saved {} operations", statuses.len());
        Ok(changes)
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`ODataSource`].
///
/// The service URL is required and checked at compile time; its syntax is
/// validated by [`build`](ODataSourceBuilder::build).
pub struct ODataSourceBuilder<U> {
    url: U,
    protocol: Protocol,
    table: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    check_ready: bool,
}

impl ODataSourceBuilder<Missing> {
    /// Creates a new builder for an OData v4 service.
    pub fn new() -> Self {
        Self {
            url: Missing,
            protocol: Protocol::ODataV4,
            table: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            check_ready: true,
        }
    }

    /// Sets the service root URL.
    pub fn url(self, url: impl Into<String>) -> ODataSourceBuilder<Set<String>> {
        ODataSourceBuilder {
            url: Set(url.into()),
            protocol: self.protocol,
            table: self.table,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            check_ready: self.check_ready,
        }
    }
}

impl Default for ODataSourceBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ODataSourceBuilder<U> {
    /// `OData` for v3 services, `ODataV4` (default) otherwise.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Default entity set used when a request carries no table reference.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Skip the service root request on `ready()`.
    pub fn skip_ready_check(mut self) -> Self {
        self.check_ready = false;
        self
    }
}

impl ODataSourceBuilder<Set<String>> {
    pub fn build(self) -> Result<ODataSource, ConfigError> {
        let parsed = Url::parse(&self.url.0).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!("unsupported scheme {}", parsed.scheme())));
        }
        if self.protocol.is_local() {
            return Err(ConfigError::UnregisteredBinding(
                "local protocol for a remote source".to_string(),
            ));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(|e| ConfigError::HttpClient(e.to_string()))?
            }
        };

        Ok(ODataSource {
            inner: Arc::new(ODataSourceInner {
                base_url: self.url.0.trim_end_matches('/').to_string(),
                protocol: self.protocol,
                table: self.table,
                http_client,
                timeout: self.timeout,
                check_ready: self.check_ready,
                ready: OnceCell::new(),
            }),
        })
    }
}

/// The unpaged query aggregates need when `query` pages its results.
fn aggregate_query(query: &Query) -> Option<Query> {
    let paged = query.page_clause().is_some();
    (paged && query.aggregates().next().is_some()).then(|| query.unpaged())
}
