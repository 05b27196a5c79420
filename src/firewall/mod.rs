//! `civo_firewall` resource

use async_trait::async_trait;

use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{AttributePath, Diagnostics, Resource};

use crate::changes;
use crate::client::ApiError;
use crate::context::{CivoContext, ContextCell};
use crate::convergence::DeleteWaiter;
use crate::guard::{has_changed, replacements};
use crate::report;
use crate::utils::{no_errors, non_empty, WithSchema, WithValidate};

mod state;

pub use state::FirewallState;

#[derive(Debug, Clone, Default)]
pub struct FirewallResource {
    context: ContextCell,
    waiter: DeleteWaiter,
}

impl FirewallResource {
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

    async fn fetch(
        &self,
        context: &CivoContext,
        state: &mut FirewallState,
    ) -> Result<bool, ApiError> {
        let Some(id) = non_empty(&state.id) else {
            return Ok(false);
        };
        let region = context
            .region_or_default(non_empty(&state.region))
            .to_owned();
        tracing::debug!(id, region = %region, "reading firewall");
        let result = context.api.get_firewall(&region, id).await;
        match result {
            Ok(firewall) => {
                state.refresh(firewall, &region);
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
        mut state: FirewallState,
    ) -> Option<FirewallState> {
        let id = non_empty(&state.id).unwrap_or_default().to_owned();
        match self.fetch(context, &mut state).await {
            Ok(true) => Some(state),
            Ok(false) => {
                diags.root_error(
                    format!("The firewall {id} disappeared"),
                    "The firewall could not be found right after it was modified.",
                );
                None
            }
            Err(err) => {
                report::api_error(diags, format!("Failed to read the firewall {id}"), &err);
                None
            }
        }
    }
}

#[async_trait]
impl Resource for FirewallResource {
    type State<'a> = Value<FirewallState>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(FirewallState::schema())
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
                tracing::warn!(id = ?state.id, "firewall not found, removing it from the state");
                Some((Value::Null, private_state))
            }
            Err(err) => {
                let id = non_empty(&state.id).unwrap_or_default();
                report::api_error(diags, format!("Failed to read the firewall {id}"), &err);
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
        if state.network_id.is_null() {
            state.network_id = Value::Unknown;
        }
        if !state.region.is_unknown() && non_empty(&state.region).is_none() {
            state.region = Value::Value(context.region.clone());
        }
        if state.create_default_rules.is_null() {
            state.create_default_rules = Value::Value(true);
        }

        Some((Value::Value(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
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

        if state.network_id.is_null() {
            state.network_id = prior.network_id.clone();
        }
        if state.create_default_rules.is_null() {
            state.create_default_rules = prior.create_default_rules;
        }
        let trigger_replace = replacements(changes!(
            prior, state;
            network_id,
            region,
            create_default_rules,
        ));
        state.id = prior.id.clone();

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
        let config = state.create_config(&region);

        tracing::info!(name = %config.name, region = %region, network = ?config.network_id, "creating firewall");
        let created = match context.api.new_firewall(&config).await {
            Ok(created) => created,
            Err(err) => {
                report::api_error(
                    diags,
                    format!("Failed to create the firewall {}", config.name),
                    &err,
                );
                return None;
            }
        };
        state.id = Value::Value(created.id);
        state.region = Value::Value(region);
        state.create_default_rules = Value::Value(config.create_rules.unwrap_or(true));

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

        if has_changed(&prior.name, &state.name) {
            let name = non_empty(&state.name).unwrap_or_default();
            tracing::info!(id = %id, name, "renaming firewall");
            if let Err(err) = context.api.rename_firewall(&region, &id, name).await {
                report::api_error(diags, format!("Failed to rename the firewall {id}"), &err);
                return None;
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

        tracing::info!(id, region, "deleting firewall");
        let result = self
            .waiter
            .run(
                move || async move {
                    api.delete_firewall(region, id)
                        .await
                        .map(|response| response.is_success())
                },
                move || api.get_firewall(region, id),
                ApiError::is_not_found,
            )
            .await;

        match result {
            Ok(converged) => {
                tracing::info!(id, polls = converged.polls, elapsed = ?converged.elapsed, "firewall deleted");
                Some(())
            }
            Err(err) => {
                report::delete_error(diags, "firewall", id, &err);
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

        let mut state = FirewallState {
            id: Value::Value(id.clone()),
            region,
            ..Default::default()
        };
        match self.fetch(&context, &mut state).await {
            Ok(true) => Some((Value::Value(state), Default::default())),
            Ok(false) => {
                diags.root_error(
                    format!("Cannot import non-existent firewall {id}"),
                    "No firewall with this ID exists in the region.",
                );
                None
            }
            Err(err) => {
                report::api_error(diags, format!("Failed to import the firewall {id}"), &err);
                None
            }
        }
    }
}
