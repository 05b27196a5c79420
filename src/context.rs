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

//! Configured client shared between the provider and its resources
//!
//! Resources are instantiated before the provider is configured,
//! so they hold a [`ContextCell`] that is filled by `configure`.

use std::fmt::Debug;
use std::sync::Arc;

use tf_provider::Diagnostics;
use tokio::sync::RwLock;

use crate::client::CivoApi;

/// Client and defaults resolved from the provider configuration
pub struct CivoContext {
    pub api: Arc<dyn CivoApi>,
    /// Region used when a resource does not set one
    pub region: String,
}

impl CivoContext {
    pub fn new(api: Arc<dyn CivoApi>, region: impl Into<String>) -> Self {
        Self {
            api,
            region: region.into(),
        }
    }

    /// Region of a resource, or the provider region
    pub fn region_or_default<'a>(&'a self, region: Option<&'a str>) -> &'a str {
        match region {
            Some(region) if !region.is_empty() => region,
            _ => &self.region,
        }
    }
}

impl Debug for CivoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CivoContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextCell(Arc<RwLock<Option<Arc<CivoContext>>>>);

impl ContextCell {
    pub async fn set(&self, context: CivoContext) {
        *self.0.write().await = Some(Arc::new(context));
    }

    pub async fn try_get(&self) -> Option<Arc<CivoContext>> {
        self.0.read().await.clone()
    }

    /// Get the context, or report that the provider is not configured
    pub async fn get(&self, diags: &mut Diagnostics) -> Option<Arc<CivoContext>> {
        let context = self.try_get().await;
        if context.is_none() {
            diags.root_error(
                "Provider is not configured",
                "The civo provider must be configured before its resources are used.",
            );
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeCivo;

    #[tokio::test]
    async fn unconfigured() {
        let cell = ContextCell::default();
        let mut diags = Diagnostics::default();
        assert!(cell.get(&mut diags).await.is_none());
        assert_eq!(diags.errors.len(), 1);
    }

    #[tokio::test]
    async fn shared_between_clones() {
        let cell = ContextCell::default();
        let resource_cell = cell.clone();
        cell.set(CivoContext::new(Arc::new(FakeCivo::new()), "NYC1"))
            .await;

        let mut diags = Diagnostics::default();
        let context = resource_cell.get(&mut diags).await.unwrap();
        assert!(diags.errors.is_empty());
        assert_eq!(context.region_or_default(None), "NYC1");
        assert_eq!(context.region_or_default(Some("")), "NYC1");
        assert_eq!(context.region_or_default(Some("LON1")), "LON1");
    }
}
