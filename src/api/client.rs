use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::cache::{FetchOutcome, ResourceClient};
use crate::config::ApiConfig;
use crate::session::CredentialStore;

use super::types::{Shipment, ShipmentFilter, User, UserFilter};

/// List endpoints answer either with a bare array or with `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
  Bare(Vec<T>),
  Envelope { data: Vec<T> },
}

impl<T> Listing<T> {
  fn into_vec(self) -> Vec<T> {
    match self {
      Listing::Bare(items) => items,
      Listing::Envelope { data } => data,
    }
  }
}

pub fn decode_listing<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, String> {
  serde_json::from_str::<Listing<T>>(body)
    .map(Listing::into_vec)
    .map_err(|e| format!("unexpected response body: {}", e))
}

/// Freight platform REST client
#[derive(Clone)]
pub struct HttpResourceClient {
  http: reqwest::Client,
  base: Url,
  credentials: Arc<dyn CredentialStore>,
}

impl HttpResourceClient {
  pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
    let mut base = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid API url '{}': {}", config.url, e))?;
    // Keep the last path segment when joining endpoint names
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("freightdesk/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      credentials,
    })
  }

  pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
    let mut url = self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint '{}': {}", path, e))?;
    if !query.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
  }

  fn get_all<T>(&self, path: &str, query: Vec<(&str, String)>) -> BoxFuture<'static, FetchOutcome<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let url = match self.endpoint(path, &query) {
      Ok(url) => url,
      Err(e) => return futures::future::ready(Err(e.to_string())).boxed(),
    };
    let Some(token) = self.credentials.token() else {
      return futures::future::ready(Err("not authenticated".to_string())).boxed();
    };
    let request = self.http.get(url.clone()).bearer_auth(token);

    async move {
      let response = request
        .send()
        .await
        .map_err(|e| format!("request to {} failed: {}", url.path(), e))?;

      let status = response.status();
      let body = response
        .text()
        .await
        .map_err(|e| format!("failed to read response from {}: {}", url.path(), e))?;

      if !status.is_success() {
        let detail: String = body.chars().take(200).collect();
        return Err(format!("{} {}: {}", status.as_u16(), url.path(), detail.trim()));
      }

      decode_listing(&body)
    }
    .boxed()
  }
}

pub fn shipment_query(filter: &ShipmentFilter) -> Vec<(&'static str, String)> {
  let mut query = Vec::new();
  if let Some(status) = filter.status {
    query.push(("status", status.to_string()));
  }
  if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
    query.push(("search", search.trim().to_string()));
  }
  query
}

pub fn user_query(filter: &UserFilter) -> Vec<(&'static str, String)> {
  let mut query = Vec::new();
  if let Some(role) = filter.role {
    query.push(("role", role.to_string()));
  }
  if let Some(approved) = filter.approved {
    query.push(("isApproved", approved.to_string()));
  }
  if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
    query.push(("search", search.trim().to_string()));
  }
  query
}

impl ResourceClient<Shipment, ShipmentFilter> for HttpResourceClient {
  fn fetch_all(&self, filter: &ShipmentFilter) -> BoxFuture<'static, FetchOutcome<Shipment>> {
    self.get_all("shipments", shipment_query(filter))
  }
}

impl ResourceClient<User, UserFilter> for HttpResourceClient {
  fn fetch_all(&self, filter: &UserFilter) -> BoxFuture<'static, FetchOutcome<User>> {
    self.get_all("users", user_query(filter))
  }
}
