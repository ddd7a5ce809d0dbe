//! HTTP implementation of [`RecordStore`] against the host's loadboard API.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{token::CSRF_TOKEN_NAME, RecordStore, TokenSource};
use crate::{
    error::{LoadboardError, Result},
    models::{Driver, Order, OrderRef, WorkOpportunity},
};

pub const CANCEL_ORDER_PATH: &str = "/api/loadboard/orders/cancel";
pub const BATCH_CANCEL_PATH: &str = "/api/loadboard/orders/batch/cancel";
pub const UPSERT_PATH: &str = "/api/loadboard/orders/upsert";
pub const ORDERS_PATH: &str = "/api/loadboard/orders/get";
pub const DRIVERS_PATH: &str = "/api/drivers/basic";
pub const SEARCH_PATH: &str = "/api/loadboard/search";
/// Page the host's own requests are issued from.
pub const ORDERS_PAGE_PATH: &str = "/loadboard/orders?state=active";

const CANCELLATION_REASON: &str = "FOUND_OTHER_WORK";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrdersEnvelope {
    #[serde(default)]
    pub(crate) truck_capacity_orders: Vec<Order>,
}

#[derive(Deserialize)]
pub(crate) struct DriversEnvelope {
    #[serde(default)]
    pub(crate) data: Vec<Driver>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub(crate) work_opportunities: Vec<WorkOpportunity>,
}

/// Authenticated client for the host API.
///
/// Every request reads a fresh token from the configured [`TokenSource`] and
/// carries the session cookie when one is configured.
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenSource>,
    cookie: Option<String>,
}

impl HttpRecordStore {
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        token: Arc<dyn TokenSource>,
        cookie: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            token,
            cookie,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| LoadboardError::Configuration {
                message: format!("Invalid endpoint {path}: {e}"),
            })
    }

    /// The single-order cancel endpoint. Id and version are pushed as path
    /// segments so reserved characters are percent-encoded.
    fn cancel_url(&self, order: &OrderRef) -> Result<Url> {
        let mut url = self.endpoint(CANCEL_ORDER_PATH)?;
        url.path_segments_mut()
            .map_err(|_| LoadboardError::Configuration {
                message: format!("Base URL {} cannot carry a path", self.base_url),
            })?
            .push(&order.id)
            .push(&order.version.to_string());
        Ok(url)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.endpoint(path)?;
        self.send_to(method, url, body).await
    }

    /// Sends one request and fails on any non-2xx status. The token is read
    /// before anything goes on the wire.
    async fn send_to(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response> {
        let token = self
            .token
            .token()
            .await
            .ok_or(LoadboardError::MissingToken)?;
        let referer = self.endpoint(ORDERS_PAGE_PATH)?;

        debug!("{method} {url}");
        let mut request = self
            .client
            .request(method, url.clone())
            .header(header::ACCEPT, "*/*")
            .header(header::REFERER, referer.as_str())
            .header(CSRF_TOKEN_NAME, token);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadboardError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Reads a success body that must be JSON.
    async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T> {
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| LoadboardError::InvalidResponse {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn cancel_order(&self, order: &OrderRef) -> Result<()> {
        let url = self.cancel_url(order)?;
        let body = json!({
            "cancellationReason": CANCELLATION_REASON,
            "cancellationComment": "",
        });
        self.send_to(Method::POST, url, Some(&body)).await?;
        Ok(())
    }

    async fn cancel_orders(&self, orders: &[OrderRef]) -> Result<()> {
        let body = json!({
            "orders": orders,
            "cancellationReason": CANCELLATION_REASON,
            "cancellationComment": "",
        });
        self.send(Method::POST, BATCH_CANCEL_PATH, Some(&body))
            .await?;
        Ok(())
    }

    async fn upsert_order(&self, payload: &Value) -> Result<Value> {
        let response = self.send(Method::POST, UPSERT_PATH, Some(payload)).await?;
        Self::json_body(response).await
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>> {
        let response = self.send(Method::GET, ORDERS_PATH, None).await?;
        let envelope: OrdersEnvelope = Self::json_body(response).await?;
        Ok(envelope.truck_capacity_orders)
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        let response = self.send(Method::GET, DRIVERS_PATH, None).await?;
        let envelope: DriversEnvelope = Self::json_body(response).await?;
        Ok(envelope.data)
    }

    async fn search_work_opportunities(&self) -> Result<Vec<WorkOpportunity>> {
        let response = self
            .send(Method::POST, SEARCH_PATH, Some(&json!({})))
            .await?;
        let envelope: SearchEnvelope = Self::json_body(response).await?;
        Ok(envelope.work_opportunities)
    }
}
