use {
    crate::adapters::envelope::CheckoutResponse,
    crate::adapters::problem::error_from_response,
    crate::domain::{error::StoreError, id::OrderId, order::Order, provider::OrderProvider},
    reqwest::Method,
    serde::Serialize,
    std::{future::Future, pin::Pin, sync::Arc, time::Duration},
    uuid::Uuid,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST /orders`. The backend resolves the cart server-side
/// from the caller's session, so the method is all we send.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: String,
}

/// REST client for the storefront backend.
#[derive(Debug)]
pub struct StoreApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<Arc<str>>,
}

impl StoreApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, StoreError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(StoreError::Validation("API base URL must be set".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(Into::into),
        })
    }

    /// Decorate a request the way every call to the backend goes out:
    /// JSON accept, fresh correlation id, bearer auth when configured.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}/{path}", self.base_url))
            .header("Accept", "application/json")
            .header("X-Correlation-Id", Uuid::new_v4().to_string());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Current representation of one order. Single shot, no retries.
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        let res = self
            .request(Method::GET, &format!("orders/{id}"))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        Ok(res.json::<Order>().await?)
    }

    /// Create an order from the caller's cart. The reply may be a plain
    /// order or a gateway envelope; see [`CheckoutResponse`].
    pub async fn create_order(
        &self,
        checkout: &CheckoutRequest,
    ) -> Result<CheckoutResponse, StoreError> {
        let res = self
            .request(Method::POST, "orders")
            .json(checkout)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        Ok(CheckoutResponse::new(res.json().await?))
    }

    /// Synchronous simulate settlement: `POST /orders/{id}/pay`.
    pub async fn pay_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        let res = self
            .request(Method::POST, &format!("orders/{id}/pay"))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        Ok(res.json::<Order>().await?)
    }
}

impl OrderProvider for StoreApi {
    fn fetch_order(
        &self,
        id: &OrderId,
    ) -> Pin<Box<dyn Future<Output = Result<Order, StoreError>> + Send + '_>> {
        let id = id.clone();
        Box::pin(async move { self.get_order(&id).await })
    }
}
