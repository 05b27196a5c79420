//! `civo_network` resource and data source

use async_trait::async_trait;

use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{AttributePath, Diagnostics, Resource};

use crate::changes;
use crate::client::{ApiError, FirewallConfig, NetworkUpdate};
use crate::context::{CivoContext, ContextCell};
use crate::convergence::DeleteWaiter;
use crate::guard::{check_immutable, has_changed, replacements};
use crate::report;
use crate::utils::{no_errors, non_empty, WithSchema, WithValidate};

mod data_source;
mod state;
mod validate;

pub use data_source::NetworkDataSource;
pub use state::NetworkState;

#[derive(Debug, Clone, Default)]
pub struct NetworkResource {
    context: ContextCell,
    waiter: DeleteWaiter,
}

impl NetworkResource {
    pub fn new(context: ContextCell) -> Self {
        Self {
            context,
            waiter: DeleteWaiter::default(),
        }
    }

    pub fn with_waiter(mut self, waiter: DeleteWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Refresh `state` from the API
    ///
    /// Returns `Ok(false)` if the network does not exist.
    async fn fetch(&self, context: &CivoContext, state: &mut NetworkState) -> Result<bool, ApiError> {
        let Some(id) = non_empty(&state.id) else {
            return Ok(false);
        };
        let region = context
            .region_or_default(non_empty(&state.region))
            .to_owned();
        tracing::debug!(id, region = %region, "reading network");
        let result = context.api.get_network(&region, id).await;
        match result {
            Ok(network) => {
                state.refresh(network, &region);
                Ok(true)
            }
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn read_back(
        &self,
        diags: &mut Diagnostics,
        context: &CivoContext,
        mut state: NetworkState,
    ) -> Option<NetworkState> {
        let id = non_empty(&state.id).unwrap_or_default().to_owned();
        match self.fetch(context, &mut state).await {
            Ok(true) => Some(state),
            Ok(false) => {
                diags.root_error(
                    format!("The network {id} disappeared"),
                    "The network could not be found right after it was modified.",
                );
                None
            }
            Err(err) => {
                report::api_error(diags, format!("Failed to read the network {id}"), &err);
                None
            }
        }
    }
}

#[async_trait]
impl Resource for NetworkResource {
    type State<'a> = Value<NetworkState>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(NetworkState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate(diags, Default::default()).await;
        no_errors(diags)
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = match state {
            Value::Value(state) => state,
            state => return Some((state, private_state)),
        };
        let context = self.context.get(diags).await?;

        match self.fetch(&context, &mut state).await {
            Ok(true) => Some((Value::Value(state), private_state)),
            Ok(false) => {
                // Gone remotely: forget it locally
                tracing::warn!(id = ?state.id, "network not found, removing it from the state");
                Some((Value::Null, private_state))
            }
            Err(err) => {
                let id = non_empty(&state.id).unwrap_or_default();
                report::api_error(diags, format!("Failed to read the network {id}"), &err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = match proposed_state {
            Value::Value(state) => state,
            state => return Some((state, Default::default())),
        };
        let context = self.context.get(diags).await?;

        state.id = Value::Unknown;
        state.name = Value::Unknown;
        state.default = Value::Unknown;
        if !state.region.is_unknown() && non_empty(&state.region).is_none() {
            state.region = Value::Value(context.region.clone());
        }
        if state.cidr_v4.is_null() {
            state.cidr_v4 = Value::Unknown;
        }
        if state.nameservers_v4.is_null() {
            state.nameservers_v4 = Value::Unknown;
        }

        Some((Value::Value(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let (prior, mut state) = match (prior_state, proposed_state) {
            (Value::Value(prior), Value::Value(proposed)) => (prior, proposed),
            (_, proposed) => return Some((proposed, prior_private_state, vec![])),
        };

        if !check_immutable(diags, &prior.id, changes!(prior, state; cidr_v4)) {
            return None;
        }
        let trigger_replace = replacements(changes!(
            prior, state;
            region,
            vlan_id,
            vlan_cidr_v4,
            vlan_gateway_ip_v4,
            vlan_physical_interface,
            vlan_allocation_pool_v4_start,
            vlan_allocation_pool_v4_end,
        ));

        state.id = prior.id.clone();
        state.default = prior.default;
        state.name = if has_changed(&prior.label, &state.label) {
            Value::Unknown
        } else {
            prior.name.clone()
        };
        if state.nameservers_v4.is_null() {
            state.nameservers_v4 = prior.nameservers_v4.clone();
        }

        Some((Value::Value(state), prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = match planned_state {
            Value::Value(state) => state,
            state => return Some((state, planned_private_state)),
        };
        let context = self.context.get(diags).await?;
        let region = context
            .region_or_default(non_empty(&state.region))
            .to_owned();
        let label = non_empty(&state.label).unwrap_or_default().to_owned();

        tracing::info!(label = %label, region = %region, "creating network");
        let created = match context
            .api
            .create_network(&state.create_config(&region))
            .await
        {
            Ok(created) => created,
            Err(err) => {
                report::api_error(diags, format!("Failed to create the network {label}"), &err);
                return None;
            }
        };
        state.id = Value::Value(created.id.clone());
        state.region = Value::Value(region.clone());

        let network_label = if created.label.is_empty() {
            &label
        } else {
            &created.label
        };
        let firewall = FirewallConfig {
            name: format!("{network_label}-default"),
            region,
            network_id: Some(created.id.clone()),
            create_rules: None,
        };
        tracing::info!(network = %created.id, firewall = %firewall.name, "creating default firewall");
        if let Err(err) = context.api.new_firewall(&firewall).await {
            // The network exists: keep tracking it
            tracing::warn!(network = %created.id, error = %err, "default firewall creation failed");
            diags.root_warning(
                format!("Failed to create the default firewall of the network {label}"),
                err.friendly(),
            );
        }

        let state = self.read_back(diags, &context, state).await?;
        Some((Value::Value(state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (prior, mut state) = match (prior_state, planned_state) {
            (Value::Value(prior), Value::Value(planned)) => (prior, planned),
            (_, planned) => return Some((planned, planned_private_state)),
        };
        let context = self.context.get(diags).await?;
        let region = context
            .region_or_default(non_empty(&state.region))
            .to_owned();
        let id = non_empty(&prior.id).unwrap_or_default().to_owned();
        state.id = prior.id.clone();

        let renamed = has_changed(&prior.label, &state.label);
        if renamed {
            let label = non_empty(&state.label).unwrap_or_default();
            tracing::info!(id = %id, label, "renaming network");
            if let Err(err) = context.api.rename_network(&region, &id, label).await {
                report::api_error(diags, format!("Failed to rename the network {id}"), &err);
                return None;
            }
        }

        if has_changed(&prior.nameservers_v4, &state.nameservers_v4) {
            let update = NetworkUpdate {
                region: region.clone(),
                nameservers_v4: state.nameservers(),
            };
            tracing::info!(id = %id, nameservers = ?update.nameservers_v4, "updating network nameservers");
            if let Err(err) = context.api.update_network(&id, &update).await {
                report::api_error(
                    diags,
                    format!("Failed to update the nameservers of the network {id}"),
                    &err,
                );
                if !renamed {
                    return None;
                }
                // The rename went through: keep what the backend holds now
                let mut current = prior;
                return match self.fetch(&context, &mut current).await {
                    Ok(true) => Some((Value::Value(current), planned_private_state)),
                    _ => None,
                };
            }
        }

        let state = self.read_back(diags, &context, state).await?;
        Some((Value::Value(state), planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Value::Value(state) = prior_state else {
            return Some(());
        };
        let Some(id) = non_empty(&state.id) else {
            return Some(());
        };
        let context = self.context.get(diags).await?;
        let api = &context.api;
        let region = context.region_or_default(non_empty(&state.region));

        tracing::info!(id, region, "deleting network");
        let result = self
            .waiter
            .run(
                move || async move {
                    api.delete_network(region, id)
                        .await
                        .map(|response| response.is_success())
                },
                move || api.get_network(region, id),
                ApiError::is_not_found,
            )
            .await;

        match result {
            Ok(converged) => {
                tracing::info!(id, polls = converged.polls, elapsed = ?converged.elapsed, "network deleted");
                Some(())
            }
            Err(err) => {
                report::delete_error(diags, "network", id, &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (region, id) = match id.split_once(':') {
            Some((region, id)) => (Value::Value(region.to_owned()), id.to_owned()),
            None => (Value::Null, id),
        };
        if id.is_empty() {
            diags.root_error(
                "Invalid import identifier",
                "Expected `ID` or `REGION:ID`.",
            );
            return None;
        }
        let context = self.context.get(diags).await?;

        let mut state = NetworkState {
            id: Value::Value(id.clone()),
            region,
            ..Default::default()
        };
        match self.fetch(&context, &mut state).await {
            Ok(true) => Some((Value::Value(state), Default::default())),
            Ok(false) => {
                diags.root_error(
                    format!("Cannot import non-existent network {id}"),
                    "No network with this ID exists in the region.",
                );
                None
            }
            Err(err) => {
                report::api_error(diags, format!("Failed to import the network {id}"), &err);
                None
            }
        }
    }
}
