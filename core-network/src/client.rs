//! QuoteDesk resource service client
//!
//! One method per service operation. Everything except the product catalog
//! goes through the [`RetryingRequestExecutor`], so each call may show the
//! sign-in surface and is retried once after an authentication rejection.

use crate::error::{NetworkError, Result};
use crate::executor::{classify_status, default_classify, Outcome, RetryingRequestExecutor};
use crate::models::{decode_lenient, HomeInfo, Product, ProductType, QuoteRequest};
use bridge_traits::http::{HttpMethod, HttpRequest, HttpResponse};
use core_auth::{AuthGate, BasicCredential, RequesterKey};
use core_runtime::config::ServiceConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Client for the resource service (`service_url`).
///
/// Cloning is cheap. Use [`for_requester`](Self::for_requester) to give a
/// screen or subsystem its own [`RequesterKey`].
#[derive(Clone)]
pub struct ResourceClient {
    service: ServiceConfig,
    executor: RetryingRequestExecutor,
    requester: RequesterKey,
}

impl ResourceClient {
    pub fn new(service: ServiceConfig, executor: RetryingRequestExecutor) -> Self {
        Self {
            service,
            executor,
            requester: RequesterKey::new(),
        }
    }

    /// Same client, issuing its token requests under `key`.
    pub fn for_requester(&self, key: RequesterKey) -> Self {
        Self {
            requester: key,
            ..self.clone()
        }
    }

    pub fn requester(&self) -> RequesterKey {
        self.requester
    }

    pub fn gate(&self) -> &Arc<AuthGate> {
        self.executor.gate()
    }

    /// Product catalog for one market. Does not require a session.
    #[instrument(skip(self))]
    pub async fn get_products(&self, product_type: ProductType) -> Result<Vec<Product>> {
        let url = self.endpoint(&format!("products/{}", product_type.as_str()))?;
        let request = HttpRequest::new(HttpMethod::Get, url).header("Accept", "application/json");

        let products = self
            .executor
            .execute_public(request, classify_list::<Product>)
            .await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Ask for a quote on `product`.
    #[instrument(skip(self, product), fields(product_id = ?product.id))]
    pub async fn send_quote_request(&self, product: &Product) -> Result<QuoteRequest> {
        let product_id = product.id.ok_or_else(|| {
            NetworkError::InvalidRequest("product has no identifier".to_string())
        })?;
        let url = self.endpoint(&format!("quotes/product/{}", product_id))?;

        let quote: QuoteRequest = self
            .executor
            .execute(
                self.requester,
                |credential| Ok(authorized(HttpMethod::Post, &url, credential)),
                default_classify,
            )
            .await?;
        info!(quote_id = quote.id, "Quote requested");
        Ok(quote)
    }

    /// Quotes the signed-in user has asked for. An account without quotes
    /// yields an empty list.
    #[instrument(skip(self))]
    pub async fn get_quotes(&self) -> Result<Vec<QuoteRequest>> {
        let url = self.endpoint("quotes")?;

        let result = self
            .executor
            .execute(
                self.requester,
                |credential| Ok(authorized(HttpMethod::Get, &url, credential)),
                classify_list::<QuoteRequest>,
            )
            .await;

        match result {
            Err(NetworkError::NotFound) => {
                debug!("No quotes on record");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// The signed-in user's home description, or `None` if they have not
    /// provided one.
    #[instrument(skip(self))]
    pub async fn get_home_info(&self) -> Result<Option<HomeInfo>> {
        let url = self.endpoint("users/homeInfo")?;

        let result = self
            .executor
            .execute(
                self.requester,
                |credential| Ok(authorized(HttpMethod::Get, &url, credential)),
                classify_optional::<HomeInfo>,
            )
            .await;

        match result {
            Err(NetworkError::NotFound) => {
                debug!("No home info on record");
                Ok(None)
            }
            other => other,
        }
    }

    /// Store `home_info` and return the stored record.
    #[instrument(skip(self, home_info))]
    pub async fn send_home_info(&self, home_info: &HomeInfo) -> Result<HomeInfo> {
        let url = self.endpoint("users/homeInfo")?;

        self.executor
            .execute(
                self.requester,
                |credential| {
                    authorized(HttpMethod::Put, &url, credential)
                        .json(home_info)
                        .map_err(|e| NetworkError::InvalidRequest(e.to_string()))
                },
                default_classify,
            )
            .await
    }

    fn endpoint(&self, path: &str) -> Result<String> {
        self.service
            .service_endpoint(path)
            .map(String::from)
            .map_err(|e| NetworkError::InvalidRequest(e.to_string()))
    }
}

fn authorized(method: HttpMethod, url: &str, credential: &BasicCredential) -> HttpRequest {
    credential.apply(HttpRequest::new(method, url).header("Accept", "application/json"))
}

/// Like [`default_classify`], but malformed list elements are dropped instead
/// of failing the whole response.
fn classify_list<T: DeserializeOwned>(response: HttpResponse) -> Outcome<Vec<T>> {
    if !response.is_success() {
        return classify_status(response.status);
    }
    match decode_lenient(&response.body) {
        Ok(items) => Outcome::Success(items),
        Err(e) => Outcome::Failed(NetworkError::InvalidResponse(e.to_string())),
    }
}

/// 2xx with an empty or undecodable body is `Success(None)`.
fn classify_optional<T: DeserializeOwned>(response: HttpResponse) -> Outcome<Option<T>> {
    if !response.is_success() {
        return classify_status(response.status);
    }
    Outcome::Success(serde_json::from_slice(&response.body).ok())
}
