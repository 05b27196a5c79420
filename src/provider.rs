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

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{map, AttributePath, Diagnostics, DynamicDataSource, DynamicResource, Provider};

use crate::client::HttpClient;
use crate::config::ProviderConfig;
use crate::context::{CivoContext, ContextCell};
use crate::firewall::FirewallResource;
use crate::network::{NetworkDataSource, NetworkResource};
use crate::utils::{no_errors, WithSchema};

/// The `civo` provider
///
/// Resources and data sources share the context filled by [`Provider::configure`].
#[derive(Debug, Default, Clone)]
pub struct CivoProvider {
    context: ContextCell,
}

#[async_trait]
impl Provider for CivoProvider {
    type Config<'a> = ProviderConfig;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        if let Value::Value(endpoint) = &config.api_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                diags.error(
                    format!("`{endpoint}` is not a valid API endpoint"),
                    "The endpoint must be an http:// or https:// URL.",
                    AttributePath::new("api_endpoint"),
                );
            }
        }
        no_errors(diags)
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let settings = match config.resolve() {
            Ok(settings) => settings,
            Err(err) => {
                diags.root_error("Invalid provider configuration", format!("{err:#}"));
                return None;
            }
        };
        let client = match HttpClient::new(&settings.api_endpoint, &settings.token) {
            Ok(client) => client,
            Err(err) => {
                diags.root_error("Could not create the Civo API client", format!("{err:#}"));
                return None;
            }
        };
        tracing::info!(
            terraform_version = %terraform_version,
            region = %settings.region,
            endpoint = %settings.api_endpoint,
            "provider configured"
        );
        self.context
            .set(CivoContext::new(Arc::new(client), settings.region))
            .await;
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        Some(map! {
            "network" => NetworkResource::new(self.context.clone()),
            "firewall" => FirewallResource::new(self.context.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(map! {
            "network" => NetworkDataSource::new(self.context.clone()),
        })
    }
}
