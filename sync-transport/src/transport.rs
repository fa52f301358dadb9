//! Conditional fetch of the orders collection

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{FetchError, TransportError};
use crate::http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use crate::outcome::FetchOutcome;
use crate::validators::CacheValidators;

/// Path of the collection endpoint, relative to the API base URL
pub const COLLECTION_PATH: &str = "orders/";

/// Name of the optional time-based cursor query parameter
pub const SINCE_PARAM: &str = "since";

/// The abstract fetch contract a poll loop depends on.
///
/// One call is one attempt; the loop never needs to know about validators,
/// URLs or HTTP.
#[async_trait]
pub trait Fetcher: Send {
    type Snapshot: Send;

    async fn fetch(&mut self) -> FetchOutcome<Self::Snapshot>;
}

/// Diagnostics about the transport's conditional-request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportStats {
    /// 304 responses in a row since the last 200
    pub consecutive_not_modified: u32,
    pub has_entity_tag: bool,
    pub has_last_modified: bool,
    /// Requests handed to the HTTP client, whatever their result
    pub requests_sent: u64,
}

/// Performs conditional GETs against one collection endpoint and classifies
/// the result as unchanged, updated or failed.
///
/// `T` is the record type of the JSON array the endpoint returns.
pub struct SyncTransport<T, C = ReqwestClient> {
    client: C,
    endpoint: Url,
    validators: CacheValidators,
    consecutive_not_modified: u32,
    requests_sent: u64,
    since_cursor: Option<String>,
    _record: PhantomData<fn() -> T>,
}

impl<T, C> std::fmt::Debug for SyncTransport<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("validators", &self.validators)
            .field("consecutive_not_modified", &self.consecutive_not_modified)
            .field("requests_sent", &self.requests_sent)
            .field("since_cursor", &self.since_cursor)
            .finish()
    }
}

/// Build `<base>/orders/` from an API base URL such as `http://localhost:8000/api`
pub fn collection_url(base_url: &str) -> Result<Url, TransportError> {
    let base = base_url.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{}/{}", base, COLLECTION_PATH))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::InvalidUrl(format!(
            "Not an HTTP base URL: {}",
            base_url
        )));
    }

    Ok(url)
}

impl<T, C> SyncTransport<T, C>
where
    T: DeserializeOwned,
    C: HttpClient,
{
    /// Create a transport for `<base_url>/orders/` using `client` for HTTP
    pub fn new(client: C, base_url: &str) -> Result<Self, TransportError> {
        let endpoint = collection_url(base_url)?;
        debug!(endpoint = %endpoint, "Created sync transport");

        Ok(Self {
            client,
            endpoint,
            validators: CacheValidators::new(),
            consecutive_not_modified: 0,
            requests_sent: 0,
            since_cursor: None,
            _record: PhantomData,
        })
    }

    /// Fix a `since` cursor that the [`Fetcher`] implementation sends with every request
    pub fn with_since_cursor(mut self, since: impl Into<String>) -> Self {
        self.since_cursor = Some(since.into());
        self
    }

    /// Perform one conditional fetch.
    ///
    /// `since` adds the time-based cursor query parameter. It is independent of
    /// the validator headers; both are sent when both are available.
    pub async fn fetch(&mut self, since: Option<&str>) -> FetchOutcome<Vec<T>> {
        self.fetch_collection(since).await
    }

    async fn fetch_collection(&mut self, since: Option<&str>) -> FetchOutcome<Vec<T>> {
        let url = self.request_url(since);

        let mut request = HttpRequest::get(url.as_str()).header("Accept", "application/json");
        for (name, value) in self.validators.conditional_headers() {
            request = request.header(name, value);
        }

        debug!(
            url = %url,
            if_none_match = ?self.validators.entity_tag,
            if_modified_since = ?self.validators.last_modified,
            "Fetching collection"
        );

        self.requests_sent += 1;
        let outcome = match self.client.execute(request).await {
            Ok(response) => self.classify(response),
            Err(e) => {
                warn!(url = %url, error = %e, "Collection request failed");
                FetchOutcome::Failed { cause: e.into() }
            }
        };

        trace!(outcome = outcome.kind(), "Fetch classified");
        outcome
    }

    fn classify(&mut self, response: HttpResponse) -> FetchOutcome<Vec<T>> {
        match response.status {
            304 => {
                self.consecutive_not_modified += 1;
                debug!(
                    consecutive_not_modified = self.consecutive_not_modified,
                    "Collection not modified"
                );
                FetchOutcome::Unchanged
            }
            200 => match serde_json::from_slice::<Vec<T>>(&response.body) {
                Ok(snapshot) => {
                    self.validators.absorb(&response);
                    self.consecutive_not_modified = 0;
                    debug!(
                        records = snapshot.len(),
                        etag = ?self.validators.entity_tag,
                        last_modified = ?self.validators.last_modified,
                        "Collection updated"
                    );
                    FetchOutcome::Updated { snapshot }
                }
                Err(e) => {
                    warn!(error = %e, "Collection body is not a JSON array of records");
                    FetchOutcome::Failed {
                        cause: FetchError::Decode(e.to_string()),
                    }
                }
            },
            status => {
                warn!(status, "Unexpected status from collection endpoint");
                FetchOutcome::Failed {
                    cause: FetchError::Status { status },
                }
            }
        }
    }
}

impl<T, C> SyncTransport<T, C> {
    fn request_url(&self, since: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(since) = since {
            url.query_pairs_mut().append_pair(SINCE_PARAM, since);
        }
        url
    }

    /// The collection endpoint this transport polls
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn validators(&self) -> &CacheValidators {
        &self.validators
    }

    /// Forget cached validators so the next request is unconditional
    pub fn reset_validators(&mut self) {
        self.validators.clear();
    }

    pub fn since_cursor(&self) -> Option<&str> {
        self.since_cursor.as_deref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            consecutive_not_modified: self.consecutive_not_modified,
            has_entity_tag: self.validators.entity_tag.is_some(),
            has_last_modified: self.validators.last_modified.is_some(),
            requests_sent: self.requests_sent,
        }
    }
}

#[async_trait]
impl<T, C> Fetcher for SyncTransport<T, C>
where
    T: DeserializeOwned + Send + 'static,
    C: HttpClient,
{
    type Snapshot = Vec<T>;

    async fn fetch(&mut self) -> FetchOutcome<Vec<T>> {
        let cursor = self.since_cursor.clone();
        self.fetch_collection(cursor.as_deref()).await
    }
}
