use reqwest::{Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    cart::{AddRequest, Cart, ChangeRequest},
    product::Product,
};

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{path} returned status {status}")]
    Status { path: String, status: StatusCode },

    #[error("could not decode {path} response: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: reqwest::Client,
    base: String,
}

impl StorefrontClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();

        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub async fn fetch_cart(&self) -> Result<Cart, StorefrontError> {
        self.get_json("/cart.js").await
    }

    pub async fn fetch_product(&self, handle: &str) -> Result<Product, StorefrontError> {
        self.get_json(&format!("/products/{handle}.js")).await
    }

    pub async fn add_items(&self, request: &AddRequest) -> Result<(), StorefrontError> {
        self.post("/cart/add.js", request).await
    }

    pub async fn change_line(&self, request: &ChangeRequest) -> Result<(), StorefrontError> {
        self.post("/cart/change.js", request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StorefrontError> {
        let response = self.http.get(self.url(path)).send().await?;

        decode(path, response).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), StorefrontError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(StorefrontError::Status {
                path: path.to_string(),
                status,
            });
        }

        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, StorefrontError> {
    let status = response.status();

    if !status.is_success() {
        return Err(StorefrontError::Status {
            path: path.to_string(),
            status,
        });
    }

    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|source| StorefrontError::Decode {
        path: path.to_string(),
        source,
    })
}
