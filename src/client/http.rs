// This file is part of the terraform-provider-civo project
//
// Copyright (C) The terraform-provider-civo contributors, 2024.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::types::RenameRequest;
use super::{
    ApiError, CivoApi, Firewall, FirewallConfig, FirewallResult, Network, NetworkConfig,
    NetworkResult, NetworkUpdate, Result, SimpleResponse,
};

/// Upper bound of a single API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Civo API client over HTTPS
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClient {
    /// Create a client for `endpoint`, authenticated with `token`
    pub fn new(endpoint: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("bearer {token}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoint, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body = %body, "Civo API error");
            return Err(ApiError::from_response(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CivoApi for HttpClient {
    async fn list_networks(&self, region: &str) -> Result<Vec<Network>> {
        tracing::debug!(region, "listing networks");
        self.send(
            self.request(Method::GET, "networks")
                .query(&[("region", region)]),
        )
        .await
    }

    async fn get_network(&self, region: &str, id: &str) -> Result<Network> {
        tracing::debug!(region, id, "getting network");
        self.send(
            self.request(Method::GET, &format!("networks/{id}"))
                .query(&[("region", region)]),
        )
        .await
    }

    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkResult> {
        tracing::debug!(?config, "creating network");
        self.send(self.request(Method::POST, "networks").json(config))
            .await
    }

    async fn rename_network(&self, region: &str, id: &str, label: &str) -> Result<NetworkResult> {
        tracing::debug!(region, id, label, "renaming network");
        let body = RenameRequest {
            label: Some(label),
            name: None,
            region,
        };
        self.send(
            self.request(Method::PUT, &format!("networks/{id}"))
                .json(&body),
        )
        .await
    }

    async fn update_network(&self, id: &str, update: &NetworkUpdate) -> Result<NetworkResult> {
        tracing::debug!(id, ?update, "updating network");
        self.send(
            self.request(Method::PUT, &format!("networks/{id}"))
                .json(update),
        )
        .await
    }

    async fn delete_network(&self, region: &str, id: &str) -> Result<SimpleResponse> {
        tracing::debug!(region, id, "deleting network");
        self.send(
            self.request(Method::DELETE, &format!("networks/{id}"))
                .query(&[("region", region)]),
        )
        .await
    }

    async fn get_firewall(&self, region: &str, id: &str) -> Result<Firewall> {
        tracing::debug!(region, id, "getting firewall");
        self.send(
            self.request(Method::GET, &format!("firewalls/{id}"))
                .query(&[("region", region)]),
        )
        .await
    }

    async fn new_firewall(&self, config: &FirewallConfig) -> Result<FirewallResult> {
        tracing::debug!(?config, "creating firewall");
        self.send(self.request(Method::POST, "firewalls").json(config))
            .await
    }

    async fn rename_firewall(&self, region: &str, id: &str, name: &str) -> Result<SimpleResponse> {
        tracing::debug!(region, id, name, "renaming firewall");
        let body = RenameRequest {
            label: None,
            name: Some(name),
            region,
        };
        self.send(
            self.request(Method::PUT, &format!("firewalls/{id}"))
                .json(&body),
        )
        .await
    }

    async fn delete_firewall(&self, region: &str, id: &str) -> Result<SimpleResponse> {
        tracing::debug!(region, id, "deleting firewall");
        self.send(
            self.request(Method::DELETE, &format!("firewalls/{id}"))
                .query(&[("region", region)]),
        )
        .await
    }
}
