use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::Customer,
    error::ErrorBody,
    protocol::{customers_route, ListCustomersResponse},
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// Collaborator endpoint for the customer collection.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, ClientError>;
    async fn create_customer(&self, customer: &Customer) -> Result<(), ClientError>;
}

pub struct HttpDirectoryApi {
    http: Client,
    customers_url: Url,
}

impl HttpDirectoryApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let invalid = |source| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        };
        let mut base = Url::parse(base_url.trim()).map_err(invalid)?;
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let customers_url = base.join(customers_route()).map_err(invalid)?;
        Ok(Self {
            http,
            customers_url,
        })
    }

    pub fn customers_url(&self) -> &Url {
        &self.customers_url
    }
}

async fn into_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(raw) => ErrorBody::parse(&raw),
        Err(err) => {
            debug!(%err, status, "failed to read error response body");
            None
        }
    };
    ClientError::Status { status, body }
}

#[async_trait]
impl DirectoryApi for HttpDirectoryApi {
    async fn list_customers(&self) -> Result<Vec<Customer>, ClientError> {
        let response = self.http.get(self.customers_url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(into_error(response).await);
        }
        let customers: ListCustomersResponse = response.json().await?;
        Ok(customers)
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.customers_url.clone())
            .json(customer)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(into_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
