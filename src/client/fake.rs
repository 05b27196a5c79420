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

//! In-memory Civo backend for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ApiError, CivoApi, Firewall, FirewallConfig, FirewallResult, Network, NetworkConfig,
    NetworkResult, NetworkUpdate, Result, SimpleResponse,
};

#[derive(Debug, Default)]
struct Inner {
    next_id: usize,
    networks: HashMap<String, Network>,
    firewalls: HashMap<String, (Firewall, FirewallConfig)>,
    /// Number of existence checks that still see the object after its deletion was accepted
    deleting: HashMap<String, usize>,
    /// Number of delete requests that are still answered as not accepted
    refused_deletes: usize,
    /// Number of network updates that still fail with a server error
    failing_updates: usize,
    calls: Vec<String>,
}

/// Fake backend
///
/// Deletions are asynchronous: after an accepted delete, the object stays visible
/// for `pending_checks` existence checks before the backend reports it missing.
#[derive(Debug, Default)]
pub(crate) struct FakeCivo {
    inner: Mutex<Inner>,
    pending_checks: usize,
}

impl FakeCivo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Keep deleted objects visible for `checks` existence checks
    pub(crate) fn with_pending_checks(mut self, checks: usize) -> Self {
        self.pending_checks = checks;
        self
    }

    /// Answer the next `count` delete requests without accepting them
    pub(crate) fn with_refused_deletes(self, count: usize) -> Self {
        self.inner.lock().unwrap().refused_deletes = count;
        self
    }

    /// Fail the next `count` network updates with a server error
    pub(crate) fn with_failing_updates(self, count: usize) -> Self {
        self.inner.lock().unwrap().failing_updates = count;
        self
    }

    /// Insert a network as if it existed remotely
    pub(crate) fn insert_network(&self, network: Network) {
        let mut inner = self.inner.lock().unwrap();
        inner.networks.insert(network.id.clone(), network);
    }

    /// Drop a network behind the provider's back
    pub(crate) fn forget_network(&self, id: &str) {
        self.inner.lock().unwrap().networks.remove(id);
    }

    pub(crate) fn forget_firewall(&self, id: &str) {
        self.inner.lock().unwrap().firewalls.remove(id);
    }

    pub(crate) fn network(&self, id: &str) -> Option<Network> {
        self.inner.lock().unwrap().networks.get(id).cloned()
    }

    pub(crate) fn firewalls(&self) -> Vec<(Firewall, FirewallConfig)> {
        let mut firewalls: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .firewalls
            .values()
            .cloned()
            .collect();
        firewalls.sort_by(|a, b| a.0.id.cmp(&b.0.id));
        firewalls
    }

    /// Calls received so far, as `operation id`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub(crate) fn count_calls(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }
}

impl Inner {
    fn record(&mut self, call: String) {
        self.calls.push(call);
    }

    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn not_found(kind: &str, id: &str) -> ApiError {
        ApiError::NotFound {
            code: format!("database_{kind}_not_found"),
            reason: format!("The requested {kind} {id} could not be found"),
        }
    }

    /// Existence check honoring pending deletions
    fn still_visible(&mut self, id: &str) -> bool {
        match self.deleting.get_mut(id) {
            Some(0) => {
                self.deleting.remove(id);
                false
            }
            Some(remaining) => {
                *remaining -= 1;
                true
            }
            None => true,
        }
    }

    fn delete(&mut self, id: &str, pending_checks: usize) -> SimpleResponse {
        if self.refused_deletes > 0 {
            self.refused_deletes -= 1;
            return SimpleResponse {
                id: id.to_owned(),
                result: "pending".to_owned(),
            };
        }
        self.deleting.entry(id.to_owned()).or_insert(pending_checks);
        SimpleResponse {
            id: id.to_owned(),
            result: "success".to_owned(),
        }
    }
}

#[async_trait]
impl CivoApi for FakeCivo {
    async fn list_networks(&self, region: &str) -> Result<Vec<Network>> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("list_networks {region}"));
        let mut networks: Vec<_> = inner
            .networks
            .values()
            .filter(|network| !inner.deleting.contains_key(&network.id))
            .cloned()
            .collect();
        networks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(networks)
    }

    async fn get_network(&self, region: &str, id: &str) -> Result<Network> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("get_network {region} {id}"));
        if !inner.networks.contains_key(id) || !inner.still_visible(id) {
            inner.networks.remove(id);
            return Err(Inner::not_found("network", id));
        }
        Ok(inner.networks[id].clone())
    }

    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkResult> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.new_id("net");
        inner.record(format!("create_network {id}"));
        let label = config.label.clone().unwrap_or_default();
        let network = Network {
            id: id.clone(),
            name: format!("cust-{}-{}", label, id),
            default: false,
            cidr: config
                .cidr_v4
                .clone()
                .unwrap_or_else(|| "192.168.1.0/24".to_owned()),
            label: label.clone(),
            status: "Active".to_owned(),
            nameservers_v4: if config.nameservers_v4.is_empty() {
                vec!["8.8.8.8".to_owned(), "1.1.1.1".to_owned()]
            } else {
                config.nameservers_v4.clone()
            },
        };
        inner.networks.insert(id.clone(), network);
        Ok(NetworkResult {
            id,
            label,
            result: "success".to_owned(),
        })
    }

    async fn rename_network(&self, region: &str, id: &str, label: &str) -> Result<NetworkResult> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("rename_network {region} {id}"));
        let network = inner
            .networks
            .get_mut(id)
            .ok_or_else(|| Inner::not_found("network", id))?;
        network.label = label.to_owned();
        Ok(NetworkResult {
            id: id.to_owned(),
            label: label.to_owned(),
            result: "success".to_owned(),
        })
    }

    async fn update_network(&self, id: &str, update: &NetworkUpdate) -> Result<NetworkResult> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("update_network {id}"));
        if inner.failing_updates > 0 {
            inner.failing_updates -= 1;
            return Err(ApiError::from_response(
                500,
                r#"{"code":"database_network_update_failed","reason":"The network could not be updated"}"#
                    .to_owned(),
            ));
        }
        // Applied from the wire body: absent fields are left untouched
        let body = serde_json::to_value(update)?;
        let network = inner
            .networks
            .get_mut(id)
            .ok_or_else(|| Inner::not_found("network", id))?;
        if let Some(nameservers) = body.get("nameservers_v4") {
            network.nameservers_v4 = serde_json::from_value(nameservers.clone())?;
        }
        Ok(NetworkResult {
            id: id.to_owned(),
            label: network.label.clone(),
            result: "success".to_owned(),
        })
    }

    async fn delete_network(&self, region: &str, id: &str) -> Result<SimpleResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("delete_network {region} {id}"));
        if !inner.networks.contains_key(id) {
            return Err(Inner::not_found("network", id));
        }
        Ok(inner.delete(id, self.pending_checks))
    }

    async fn get_firewall(&self, region: &str, id: &str) -> Result<Firewall> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("get_firewall {region} {id}"));
        if !inner.firewalls.contains_key(id) || !inner.still_visible(id) {
            inner.firewalls.remove(id);
            return Err(Inner::not_found("firewall", id));
        }
        Ok(inner.firewalls[id].0.clone())
    }

    async fn new_firewall(&self, config: &FirewallConfig) -> Result<FirewallResult> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.new_id("fw");
        inner.record(format!("new_firewall {id}"));
        let firewall = Firewall {
            id: id.clone(),
            name: config.name.clone(),
            network_id: config
                .network_id
                .clone()
                .unwrap_or_else(|| "net-default".to_owned()),
            rules_count: if config.create_rules.unwrap_or(true) {
                4
            } else {
                0
            },
        };
        inner
            .firewalls
            .insert(id.clone(), (firewall, config.clone()));
        Ok(FirewallResult {
            id,
            name: config.name.clone(),
            result: "success".to_owned(),
        })
    }

    async fn rename_firewall(&self, region: &str, id: &str, name: &str) -> Result<SimpleResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("rename_firewall {region} {id}"));
        let (firewall, _) = inner
            .firewalls
            .get_mut(id)
            .ok_or_else(|| Inner::not_found("firewall", id))?;
        firewall.name = name.to_owned();
        Ok(SimpleResponse {
            id: id.to_owned(),
            result: "success".to_owned(),
        })
    }

    async fn delete_firewall(&self, region: &str, id: &str) -> Result<SimpleResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("delete_firewall {region} {id}"));
        if !inner.firewalls.contains_key(id) {
            return Err(Inner::not_found("firewall", id));
        }
        Ok(inner.delete(id, self.pending_checks))
    }
}
