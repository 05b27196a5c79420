use async_trait::async_trait;

use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics};

use crate::utils::{validate_cidr, validate_ipv4, validate_name, WithValidate};

use super::state::NetworkState;

pub const VLAN_ID_RANGE: std::ops::RangeInclusive<i64> = 1..=4094;

#[async_trait]
impl WithValidate for NetworkState {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_name(diags, &self.label, attr_path.clone().attribute("label"));
        validate_cidr(diags, &self.cidr_v4, attr_path.clone().attribute("cidr_v4"));

        if let Value::Value(nameservers) = &self.nameservers_v4 {
            for (i, nameserver) in nameservers.iter().enumerate() {
                validate_ipv4(
                    diags,
                    nameserver,
                    attr_path.clone().attribute("nameservers_v4").index(i as i64),
                );
            }
        }

        validate_cidr(
            diags,
            &self.vlan_cidr_v4,
            attr_path.clone().attribute("vlan_cidr_v4"),
        );
        for (name, ip) in [
            ("vlan_gateway_ip_v4", &self.vlan_gateway_ip_v4),
            (
                "vlan_allocation_pool_v4_start",
                &self.vlan_allocation_pool_v4_start,
            ),
            (
                "vlan_allocation_pool_v4_end",
                &self.vlan_allocation_pool_v4_end,
            ),
        ] {
            validate_ipv4(diags, ip, attr_path.clone().attribute(name));
        }

        match self.vlan_id {
            Value::Value(vlan_id) => {
                if !VLAN_ID_RANGE.contains(&vlan_id) {
                    diags.error(
                        format!("`vlan_id` {vlan_id} is out of range"),
                        format!(
                            "A VLAN ID must be between {} and {}.",
                            VLAN_ID_RANGE.start(),
                            VLAN_ID_RANGE.end()
                        ),
                        attr_path.clone().attribute("vlan_id"),
                    );
                }
            }
            Value::Null => {
                for (name, value) in [
                    ("vlan_cidr_v4", &self.vlan_cidr_v4),
                    ("vlan_gateway_ip_v4", &self.vlan_gateway_ip_v4),
                    ("vlan_physical_interface", &self.vlan_physical_interface),
                    (
                        "vlan_allocation_pool_v4_start",
                        &self.vlan_allocation_pool_v4_start,
                    ),
                    (
                        "vlan_allocation_pool_v4_end",
                        &self.vlan_allocation_pool_v4_end,
                    ),
                ] {
                    if !value.is_null() {
                        diags.warning(
                            format!("`{name}` is ignored without `vlan_id`"),
                            "VLAN settings are only sent when `vlan_id` is set.",
                            attr_path.clone().attribute(name),
                        );
                    }
                }
            }
            Value::Unknown => (),
        }
    }
}
