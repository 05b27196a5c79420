use std::net::Ipv4Addr;

use async_trait::async_trait;
use ipnet::Ipv4Net;

use tf_provider::schema::Schema;
use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics};

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

#[async_trait]
pub(crate) trait WithValidate {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

#[async_trait]
impl<T: WithValidate + Sync> WithValidate for Value<T> {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Value::Value(value) = self {
            value.validate(diags, attr_path).await;
        }
    }
}

/// Check a resource name: non-empty and without whitespace
pub(crate) fn validate_name(diags: &mut Diagnostics, name: &Value<String>, attr_path: AttributePath) {
    match name {
        Value::Value(name) => {
            if name.is_empty() {
                diags.error_short("The name cannot be empty", attr_path);
            } else if name.chars().any(char::is_whitespace) {
                diags.error(
                    "The name cannot contain whitespace",
                    format!("`{name}` is not a valid name."),
                    attr_path,
                );
            }
        }
        Value::Null => diags.error_short("The name cannot be null", attr_path),
        Value::Unknown => (),
    }
}

/// Check an optional IPv4 CIDR block
pub(crate) fn validate_cidr(diags: &mut Diagnostics, cidr: &Value<String>, attr_path: AttributePath) {
    if let Value::Value(cidr) = cidr {
        if let Err(err) = cidr.parse::<Ipv4Net>() {
            diags.error(
                format!("`{cidr}` is not a valid IPv4 CIDR block"),
                format!("Expected a block like 10.0.0.0/24: {err}"),
                attr_path,
            );
        }
    }
}

/// Check an optional IPv4 address
pub(crate) fn validate_ipv4(diags: &mut Diagnostics, ip: &Value<String>, attr_path: AttributePath) {
    if let Value::Value(ip) = ip {
        if ip.parse::<Ipv4Addr>().is_err() {
            diags.error_short(format!("`{ip}` is not a valid IPv4 address"), attr_path);
        }
    }
}

/// Return `Some(())` if no error has been recorded
pub(crate) fn no_errors(diags: &Diagnostics) -> Option<()> {
    if diags.errors.is_empty() {
        Some(())
    } else {
        None
    }
}

/// Known and non-empty string
pub(crate) fn non_empty(value: &Value<String>) -> Option<&str> {
    match value {
        Value::Value(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        let mut diags = Diagnostics::default();
        validate_name(&mut diags, &Value::Value("prod-net".into()), AttributePath::new("label"));
        validate_name(&mut diags, &Value::Unknown, AttributePath::new("label"));
        assert!(diags.errors.is_empty());

        validate_name(&mut diags, &Value::Value("".into()), AttributePath::new("label"));
        validate_name(&mut diags, &Value::Value("my net".into()), AttributePath::new("label"));
        assert_eq!(diags.errors.len(), 2);
        assert_eq!(diags.errors[1].attribute, AttributePath::new("label"));
    }

    #[test]
    fn addresses() {
        let mut diags = Diagnostics::default();
        validate_cidr(&mut diags, &Value::Value("10.0.0.0/24".into()), AttributePath::new("cidr_v4"));
        validate_cidr(&mut diags, &Value::Null, AttributePath::new("cidr_v4"));
        validate_ipv4(&mut diags, &Value::Value("8.8.8.8".into()), AttributePath::new("ip"));
        assert!(diags.errors.is_empty());

        validate_cidr(&mut diags, &Value::Value("10.0.0.0".into()), AttributePath::new("cidr_v4"));
        validate_cidr(&mut diags, &Value::Value("300.0.0.0/8".into()), AttributePath::new("cidr_v4"));
        validate_ipv4(&mut diags, &Value::Value("8.8.8".into()), AttributePath::new("ip"));
        assert_eq!(diags.errors.len(), 3);
        assert!(no_errors(&diags).is_none());
    }

    #[test]
    fn empty_strings() {
        assert_eq!(non_empty(&Value::Value("a".into())), Some("a"));
        assert_eq!(non_empty(&Value::Value("".into())), None);
        assert_eq!(non_empty(&Value::Unknown), None);
    }
}
