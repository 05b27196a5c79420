use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::Value;
use tf_provider::{map, AttributePath, Diagnostics};

use crate::client::{Firewall, FirewallConfig};
use crate::utils::{non_empty, validate_name, WithSchema, WithValidate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FirewallState {
    pub id: Value<String>,
    pub name: Value<String>,
    pub network_id: Value<String>,
    pub region: Value<String>,
    pub create_default_rules: Value<bool>,
}

impl FirewallState {
    pub fn create_config(&self, region: &str) -> FirewallConfig {
        FirewallConfig {
            name: non_empty(&self.name).unwrap_or_default().to_owned(),
            region: region.to_owned(),
            network_id: non_empty(&self.network_id).map(str::to_owned),
            create_rules: Some(self.create_default_rules.unwrap_or(true)),
        }
    }

    /// Copy the remote attributes into the state
    ///
    /// `create_default_rules` is not returned by the API: an unset value (after an import)
    /// is derived from the rules of the firewall.
    pub fn refresh(&mut self, firewall: Firewall, region: &str) {
        self.id = Value::Value(firewall.id);
        self.name = Value::Value(firewall.name);
        self.network_id = Value::Value(firewall.network_id);
        self.region = Value::Value(region.to_owned());
        if !self.create_default_rules.is_value() {
            self.create_default_rules = Value::Value(firewall.rules_count > 0);
        }
    }
}

impl WithSchema for FirewallState {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("ID of the firewall"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The firewall name"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "network_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "The firewall network. If omitted, the default network of the region is used",
                        ),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The firewall region"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "create_default_rules" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain(
                            "Create the default rules (open ports 22, 80, 443 and 6443). Defaults to `true`",
                        ),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                },
                description: Description::plain(
                    "Provides a Civo firewall resource. This can be used to create, modify, and delete firewalls.",
                ),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl WithValidate for FirewallState {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_name(diags, &self.name, attr_path.attribute("name"));
    }
}
