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

use serde::{Deserialize, Serialize};

/// Network as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub cidr: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub nameservers_v4: Vec<String>,
}

/// Request body to create a network
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NetworkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_v4: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nameservers_v4: Vec<String>,
    #[serde(rename = "vlan_connect", skip_serializing_if = "Option::is_none")]
    pub vlan: Option<VlanConnectConfig>,
}

/// Request body to update the nameservers of a network
///
/// The list is always sent: an empty list clears the nameservers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NetworkUpdate {
    pub region: String,
    pub nameservers_v4: Vec<String>,
}

/// VLAN connection of a network
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VlanConnectConfig {
    pub vlan_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub physical_interface: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cidr_v4: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gateway_ipv4: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allocation_pool_v4_start: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allocation_pool_v4_end: String,
}

/// Answer to a network creation, rename or update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkResult {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub result: String,
}

/// Firewall as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Firewall {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub rules_count: i64,
}

/// Request body to create a firewall
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FirewallConfig {
    pub name: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_rules: Option<bool>,
}

/// Answer to a firewall creation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FirewallResult {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub result: String,
}

/// Generic answer to mutating calls
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimpleResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub result: String,
}

impl SimpleResponse {
    /// Check if the backend accepted the request
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// Request body to rename an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RenameRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub region: &'a str,
}
