use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueList};
use tf_provider::{map, AttributePath, DataSource, Diagnostics};

use crate::client::Network;
use crate::context::ContextCell;
use crate::report;
use crate::utils::{no_errors, non_empty};

/// Lookup of an existing network, by id or by label
#[derive(Debug, Clone, Default)]
pub struct NetworkDataSource {
    context: ContextCell,
}

impl NetworkDataSource {
    pub fn new(context: ContextCell) -> Self {
        Self { context }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetworkDataSourceState {
    pub id: Value<String>,
    pub label: Value<String>,
    pub region: Value<String>,
    pub name: Value<String>,
    pub default: Value<bool>,
    pub cidr_v4: Value<String>,
    pub nameservers_v4: ValueList<Value<String>>,
}

impl NetworkDataSourceState {
    fn fill(&mut self, network: Network, region: &str) {
        self.id = Value::Value(network.id);
        self.label = Value::Value(network.label);
        self.region = Value::Value(region.to_owned());
        self.name = Value::Value(network.name);
        self.default = Value::Value(network.default);
        self.cidr_v4 = Value::Value(network.cidr);
        self.nameservers_v4 = Value::Value(
            network
                .nameservers_v4
                .into_iter()
                .map(Value::Value)
                .collect(),
        );
    }
}

#[async_trait]
impl DataSource for NetworkDataSource {
    type State<'a> = NetworkDataSourceState;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        let computed = |attr_type: AttributeType, description: &str| Attribute {
            attr_type,
            description: Description::plain(description),
            constraint: AttributeConstraint::Computed,
            ..Default::default()
        };
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the network"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "label" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The label of the network"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region of the network"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => computed(AttributeType::String, "The name of the network"),
                    "default" => computed(
                        AttributeType::Bool,
                        "If the network is default, this will be `true`",
                    ),
                    "cidr_v4" => computed(AttributeType::String, "The CIDR block of the network"),
                    "nameservers_v4" => computed(
                        AttributeType::List(AttributeType::String.into()),
                        "List of nameservers of the network",
                    ),
                },
                description: Description::plain(
                    "Retrieves information about a network, by id or by label",
                ),
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        match (config.id.is_null(), config.label.is_null()) {
            (true, true) => diags.root_error(
                "Missing network lookup key",
                "One of `id` or `label` must be set.",
            ),
            (false, false) => diags.error(
                "Conflicting network lookup keys",
                "Only one of `id` or `label` can be set.",
                AttributePath::new("label"),
            ),
            _ => (),
        }
        no_errors(diags)
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let context = self.context.get(diags).await?;
        let region = context
            .region_or_default(non_empty(&config.region))
            .to_owned();

        let network = if let Some(id) = non_empty(&config.id) {
            tracing::debug!(id, region = %region, "looking up network by id");
            match context.api.get_network(&region, id).await {
                Ok(network) => network,
                Err(err) if err.is_not_found() => {
                    diags.error(
                        format!("No network with id {id} in region {region}"),
                        err.friendly(),
                        AttributePath::new("id"),
                    );
                    return None;
                }
                Err(err) => {
                    report::api_error(diags, format!("Failed to read the network {id}"), &err);
                    return None;
                }
            }
        } else {
            let label = non_empty(&config.label).unwrap_or_default();
            tracing::debug!(label, region = %region, "looking up network by label");
            let networks = match context.api.list_networks(&region).await {
                Ok(networks) => networks,
                Err(err) => {
                    report::api_error(diags, format!("Failed to list the networks of {region}"), &err);
                    return None;
                }
            };
            match networks.into_iter().find(|network| network.label == label) {
                Some(network) => network,
                None => {
                    diags.error_short(
                        format!("No network with label {label} in region {region}"),
                        AttributePath::new("label"),
                    );
                    return None;
                }
            }
        };

        let mut state = config;
        state.fill(network, &region);
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::fake::FakeCivo;
    use crate::context::CivoContext;

    async fn setup() -> NetworkDataSource {
        let fake = FakeCivo::new();
        for (id, label, default) in [("net-a", "default", true), ("net-b", "prod", false)] {
            fake.insert_network(Network {
                id: id.to_owned(),
                name: format!("cust-{label}"),
                default,
                cidr: "10.0.0.0/24".to_owned(),
                label: label.to_owned(),
                status: "Active".to_owned(),
                nameservers_v4: vec!["1.1.1.1".to_owned()],
            });
        }
        let context = ContextCell::default();
        context.set(CivoContext::new(Arc::new(fake), "LON1")).await;
        NetworkDataSource::new(context)
    }

    #[tokio::test]
    async fn lookup_by_label() {
        let data_source = setup().await;
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(
                &mut diags,
                NetworkDataSourceState {
                    label: Value::Value("prod".to_owned()),
                    ..Default::default()
                },
                Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(state.id, Value::Value("net-b".to_owned()));
        assert_eq!(state.default, Value::Value(false));
        assert_eq!(state.region, Value::Value("LON1".to_owned()));
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let data_source = setup().await;
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(
                &mut diags,
                NetworkDataSourceState {
                    id: Value::Value("net-a".to_owned()),
                    ..Default::default()
                },
                Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(state.label, Value::Value("default".to_owned()));
        assert_eq!(state.default, Value::Value(true));
        assert_eq!(state.cidr_v4, Value::Value("10.0.0.0/24".to_owned()));
    }

    #[tokio::test]
    async fn missing_network_is_an_error() {
        let data_source = setup().await;
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(
                &mut diags,
                NetworkDataSourceState {
                    label: Value::Value("staging".to_owned()),
                    ..Default::default()
                },
                Default::default(),
            )
            .await;
        assert!(state.is_none());
        assert_eq!(diags.errors[0].attribute, AttributePath::new("label"));
    }

    #[tokio::test]
    async fn exactly_one_key() {
        let data_source = setup().await;

        let mut diags = Diagnostics::default();
        assert!(data_source
            .validate(&mut diags, Default::default())
            .await
            .is_none());

        let mut diags = Diagnostics::default();
        let config = NetworkDataSourceState {
            id: Value::Value("net-a".to_owned()),
            label: Value::Value("default".to_owned()),
            ..Default::default()
        };
        assert!(data_source.validate(&mut diags, config).await.is_none());

        let mut diags = Diagnostics::default();
        let config = NetworkDataSourceState {
            id: Value::Unknown,
            ..Default::default()
        };
        assert!(data_source.validate(&mut diags, config).await.is_some());
    }
}
