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

//! Terraform provider for Civo networks and firewalls
//!
//! The provider exposes the `civo_network` and `civo_firewall` resources and the
//! `civo_network` data source, backed by the Civo REST API.

mod context;
mod firewall;
mod network;
mod provider;
mod report;
mod utils;

pub mod client;
pub mod config;
pub mod convergence;
pub mod errors;
pub mod guard;
pub mod logging;

pub use context::{CivoContext, ContextCell};
pub use firewall::{FirewallResource, FirewallState};
pub use network::{NetworkDataSource, NetworkResource, NetworkState};
pub use provider::CivoProvider;
