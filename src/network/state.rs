use serde::{Deserialize, Serialize};

use tf_provider::map;
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueList};

use crate::client::{Network, NetworkConfig, VlanConnectConfig};
use crate::utils::{non_empty, WithSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetworkState {
    pub id: Value<String>,
    pub label: Value<String>,
    pub region: Value<String>,
    pub cidr_v4: Value<String>,
    pub nameservers_v4: ValueList<Value<String>>,
    pub name: Value<String>,
    pub default: Value<bool>,
    pub vlan_id: Value<i64>,
    pub vlan_cidr_v4: Value<String>,
    pub vlan_gateway_ip_v4: Value<String>,
    pub vlan_physical_interface: Value<String>,
    pub vlan_allocation_pool_v4_start: Value<String>,
    pub vlan_allocation_pool_v4_end: Value<String>,
}

impl NetworkState {
    pub fn nameservers(&self) -> Vec<String> {
        self.nameservers_v4
            .iter()
            .flatten()
            .filter_map(|nameserver| nameserver.as_ref_option().cloned())
            .collect()
    }

    /// VLAN connection, only when a VLAN id is set
    pub fn vlan(&self) -> Option<VlanConnectConfig> {
        let vlan_id = *self.vlan_id.as_ref_option()?;
        if vlan_id <= 0 {
            return None;
        }
        let string = |value: &Value<String>| non_empty(value).unwrap_or_default().to_owned();
        Some(VlanConnectConfig {
            vlan_id,
            physical_interface: string(&self.vlan_physical_interface),
            cidr_v4: string(&self.vlan_cidr_v4),
            gateway_ipv4: string(&self.vlan_gateway_ip_v4),
            allocation_pool_v4_start: string(&self.vlan_allocation_pool_v4_start),
            allocation_pool_v4_end: string(&self.vlan_allocation_pool_v4_end),
        })
    }

    /// Request body to create the network
    pub fn create_config(&self, region: &str) -> NetworkConfig {
        NetworkConfig {
            label: non_empty(&self.label).map(str::to_owned),
            region: region.to_owned(),
            cidr_v4: non_empty(&self.cidr_v4).map(str::to_owned),
            nameservers_v4: self.nameservers(),
            vlan: self.vlan(),
        }
    }

    /// Copy the remote attributes into the state
    ///
    /// VLAN attributes are not returned by the API and are kept as is.
    pub fn refresh(&mut self, network: Network, region: &str) {
        self.id = Value::Value(network.id);
        self.region = Value::Value(region.to_owned());
        self.label = Value::Value(network.label);
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

impl WithSchema for NetworkState {
    fn schema() -> Schema {
        let vlan_attribute = |description: &str| Attribute {
            attr_type: AttributeType::String,
            description: Description::plain(description),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        };
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("ID of the network"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "label" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Name for the network"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "The region of the network. Changing it replaces the network",
                        ),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "cidr_v4" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "The CIDR block for the network. Cannot be changed once the network is created",
                        ),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "nameservers_v4" => Attribute {
                        attr_type: AttributeType::List(AttributeType::String.into()),
                        description: Description::plain("List of nameservers for the network"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the network"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "default" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain(
                            "If the network is default, this will be `true`",
                        ),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "vlan_id" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain(
                            "VLAN ID for the network. Changing it replaces the network",
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "vlan_cidr_v4" => vlan_attribute("CIDR for VLAN IPv4"),
                    "vlan_gateway_ip_v4" => vlan_attribute("Gateway IP for VLAN IPv4"),
                    "vlan_physical_interface" => vlan_attribute("Physical interface for VLAN"),
                    "vlan_allocation_pool_v4_start" => vlan_attribute(
                        "Start of the IPv4 allocation pool for VLAN",
                    ),
                    "vlan_allocation_pool_v4_end" => vlan_attribute(
                        "End of the IPv4 allocation pool for VLAN",
                    ),
                },
                description: Description::plain(
                    "Provides a Civo network resource. This can be used to create, modify, and delete networks. \
                     A firewall named `<label>-default` is created along with the network; \
                     if its creation fails, a warning is reported and the network is still kept.",
                ),
                ..Default::default()
            },
        }
    }
}
