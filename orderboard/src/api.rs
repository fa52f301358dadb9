//! One-shot calls against the orders REST API
//!
//! These are plain request/response calls; only the collection listing is
//! kept fresh by the poll loop.

use serde::de::DeserializeOwned;
use sync_transport::{
    HttpClient, HttpRequest, HttpResponse, ReqwestClient, DEFAULT_CONNECT_TIMEOUT,
};
use tracing::{debug, warn};
use url::Url;

use crate::config::DashboardConfig;
use crate::error::ApiError;
use crate::model::{NewOrder, Order, OrderStatus, StatusUpdate};

/// Client for the individual order endpoints under `<base>/orders/`
#[derive(Debug, Clone)]
pub struct OrdersApi<C = ReqwestClient> {
    client: C,
    collection: Url,
}

impl OrdersApi<ReqwestClient> {
    /// reqwest-backed client using the base URL and request timeout of `config`
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ApiError> {
        let client = ReqwestClient::with_timeouts(DEFAULT_CONNECT_TIMEOUT, config.request_timeout)?;
        Self::new(client, &config.base_url)
    }
}

impl<C: HttpClient> OrdersApi<C> {
    pub fn new(client: C, base_url: &str) -> Result<Self, ApiError> {
        let collection = sync_transport::collection_url(base_url)?;
        Ok(Self { client, collection })
    }

    /// `<base>/orders/`
    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    /// `<base>/orders/{id}/`, with the id percent-encoded as one path segment
    pub fn order_url(&self, id: &str) -> Result<Url, ApiError> {
        if id.trim().is_empty() || id.contains('/') {
            return Err(ApiError::InvalidId(id.to_string()));
        }

        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidId(id.to_string()))?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url)
    }

    /// Unconditional `GET <base>/orders/`
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = HttpRequest::get(self.collection.as_str()).header("Accept", "application/json");
        self.send(request).await
    }

    /// `GET <base>/orders/{id}/`
    pub async fn get_order(&self, id: &str) -> Result<Order, ApiError> {
        let url = self.order_url(id)?;
        let request = HttpRequest::get(url.as_str()).header("Accept", "application/json");
        self.send(request).await
    }

    /// `PATCH <base>/orders/{id}/` with `{"status": ...}`; returns the updated order
    pub async fn update_status(&self, id: &str, status: &OrderStatus) -> Result<Order, ApiError> {
        let url = self.order_url(id)?;
        let request = HttpRequest::patch(url.as_str())
            .header("Accept", "application/json")
            .json(&StatusUpdate { status })?;

        debug!(order_id = id, status = %status, "Updating order status");
        self.send(request).await
    }

    /// `POST <base>/orders/`; returns the order as stored
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let request = HttpRequest::post(self.collection.as_str())
            .header("Accept", "application/json")
            .json(order)?;

        debug!(order_id = %order.id, items = order.items.len(), "Creating order");
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.client.execute(request).await?;

        if !response.is_success() {
            warn!(%method, %url, status = response.status, "Orders API returned an error");
            return Err(ApiError::Status {
                status: response.status,
                body: response.body_text(),
            });
        }

        decode(&response)
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}
