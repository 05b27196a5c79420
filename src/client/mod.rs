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

//! Civo API client
//!
//! Resources only talk to the backend through the [`CivoApi`] trait.
//! [`HttpClient`] is the implementation used by the provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::{friendly_message, parse_error_payload};

mod http;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpClient;
pub use types::{
    Firewall, FirewallConfig, FirewallResult, Network, NetworkConfig, NetworkResult,
    NetworkUpdate, SimpleResponse, VlanConnectConfig,
};

/// Error returned by the Civo API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested object does not exist
    #[error("{reason} (code: {code})")]
    NotFound { code: String, reason: String },
    /// The API answered with an error status
    #[error("Civo API answered with status {status}: {body}")]
    Http { status: u16, body: String },
    /// The request could not be sent, or the answer could not be received
    #[error("request to the Civo API failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The answer could not be decoded
    #[error("could not decode the Civo API answer: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Build an error from a failed HTTP answer
    pub fn from_response(status: u16, body: String) -> Self {
        let payload = parse_error_payload(&body);
        match payload {
            Some(payload) if status == 404 || payload.is_not_found() => ApiError::NotFound {
                code: payload.code,
                reason: payload.reason,
            },
            None if status == 404 => ApiError::NotFound {
                code: "not_found".to_owned(),
                reason: body,
            },
            _ => ApiError::Http { status, body },
        }
    }

    /// Check if the error means the object does not exist (anymore)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Readable version of the error, suitable for diagnostics
    pub fn friendly(&self) -> String {
        match self {
            ApiError::Http { status, body } => {
                format!("{} (HTTP {})", friendly_message(body), status)
            }
            err => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Operations of the Civo API used by the provider
///
/// Every call takes the region explicitly: the client itself is shared by all resources.
#[async_trait]
pub trait CivoApi: Send + Sync + 'static {
    /// List the networks of a region
    async fn list_networks(&self, region: &str) -> Result<Vec<Network>>;
    /// Get a single network
    async fn get_network(&self, region: &str, id: &str) -> Result<Network>;
    /// Create a network
    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkResult>;
    /// Change the label of a network
    async fn rename_network(&self, region: &str, id: &str, label: &str) -> Result<NetworkResult>;
    /// Replace the nameservers of a network
    async fn update_network(&self, id: &str, update: &NetworkUpdate) -> Result<NetworkResult>;
    /// Request the deletion of a network
    async fn delete_network(&self, region: &str, id: &str) -> Result<SimpleResponse>;

    /// Get a single firewall
    async fn get_firewall(&self, region: &str, id: &str) -> Result<Firewall>;
    /// Create a firewall
    async fn new_firewall(&self, config: &FirewallConfig) -> Result<FirewallResult>;
    /// Change the name of a firewall
    async fn rename_firewall(&self, region: &str, id: &str, name: &str) -> Result<SimpleResponse>;
    /// Request the deletion of a firewall
    async fn delete_firewall(&self, region: &str, id: &str) -> Result<SimpleResponse>;
}
