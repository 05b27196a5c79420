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

//! Provider configuration block and credential resolution

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use tf_provider::map;
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::Value;

use crate::utils::{non_empty, WithSchema};

pub const DEFAULT_REGION: &str = "LON1";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.civo.com";

pub const ENV_TOKEN: &str = "CIVO_TOKEN";
pub const ENV_REGION: &str = "CIVO_REGION";
pub const ENV_API_URL: &str = "CIVO_API_URL";

/// Content of the `provider "civo"` block
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub token: Value<String>,
    pub credential_file: Value<String>,
    pub region: Value<String>,
    pub api_endpoint: Value<String>,
}

impl WithSchema for ProviderConfig {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "token" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "Civo API token. Defaults to the `{ENV_TOKEN}` environment variable, then to `credential_file`"
                        )),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "credential_file" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "Path to a JSON file holding the API token under the `CIVO_TOKEN` key",
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "Default region of the resources. Defaults to the `{ENV_REGION}` environment variable, then to `{DEFAULT_REGION}`"
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "api_endpoint" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "URL of the Civo API. Defaults to the `{ENV_API_URL}` environment variable, then to `{DEFAULT_API_ENDPOINT}`"
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                },
                description: Description::plain("Civo networks and firewalls"),
                ..Default::default()
            },
        }
    }
}

/// Fully resolved provider settings
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub region: String,
    pub api_endpoint: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"<redacted>")
            .field("region", &self.region)
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

#[derive(Deserialize)]
struct CredentialFile {
    #[serde(rename = "CIVO_TOKEN")]
    token: String,
}

impl ProviderConfig {
    /// Resolve the settings from the block and the process environment
    pub fn resolve(&self) -> Result<Settings> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve the settings, looking up environment variables with `env`
    ///
    /// Each setting is taken from the block first, then from the environment,
    /// and the token finally from the credential file.
    pub fn resolve_with<F>(&self, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.is_empty());

        let token = match non_empty(&self.token) {
            Some(token) => token.to_owned(),
            None => match lookup(ENV_TOKEN) {
                Some(token) => token,
                None => match non_empty(&self.credential_file) {
                    Some(path) => read_credential_file(path)?,
                    None => {
                        return Err(anyhow!(
                            "no Civo API token: set `token`, the {ENV_TOKEN} environment variable, or `credential_file`"
                        ))
                    }
                },
            },
        };

        let region = non_empty(&self.region)
            .map(str::to_owned)
            .or_else(|| lookup(ENV_REGION))
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());

        let api_endpoint = non_empty(&self.api_endpoint)
            .map(str::to_owned)
            .or_else(|| lookup(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_owned());

        Ok(Settings {
            token,
            region,
            api_endpoint,
        })
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

fn read_credential_file(path: &str) -> Result<String> {
    let path = expand_home(path);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("could not read the credential file {}", path.display()))?;
    let credentials: CredentialFile = serde_json::from_str(&content)
        .with_context(|| format!("invalid credential file {}", path.display()))?;
    if credentials.token.is_empty() {
        return Err(anyhow!(
            "the credential file {} has an empty CIVO_TOKEN",
            path.display()
        ));
    }
    tracing::debug!(path = %path.display(), "token read from the credential file");
    Ok(credentials.token)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn credential_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn explicit_token_wins() {
        let file = credential_file(r#"{"CIVO_TOKEN":"from-file"}"#);
        let config = ProviderConfig {
            token: Value::Value("explicit".into()),
            credential_file: Value::Value(file.path().display().to_string()),
            ..Default::default()
        };
        let settings = config
            .resolve_with(env(&[(ENV_TOKEN, "from-env")]))
            .unwrap();
        assert_eq!(settings.token, "explicit");
    }

    #[test]
    fn env_token_before_file() {
        let file = credential_file(r#"{"CIVO_TOKEN":"from-file"}"#);
        let config = ProviderConfig {
            credential_file: Value::Value(file.path().display().to_string()),
            ..Default::default()
        };
        let settings = config
            .resolve_with(env(&[(ENV_TOKEN, "from-env")]))
            .unwrap();
        assert_eq!(settings.token, "from-env");

        let settings = config.resolve_with(env(&[])).unwrap();
        assert_eq!(settings.token, "from-file");
    }

    #[test]
    fn missing_token() {
        assert!(ProviderConfig::default().resolve_with(env(&[])).is_err());

        let file = credential_file(r#"{"OTHER":"x"}"#);
        let config = ProviderConfig {
            credential_file: Value::Value(file.path().display().to_string()),
            ..Default::default()
        };
        assert!(config.resolve_with(env(&[])).is_err());

        let config = ProviderConfig {
            credential_file: Value::Value("/nonexistent/credential.json".into()),
            ..Default::default()
        };
        assert!(config.resolve_with(env(&[])).is_err());
    }

    #[test]
    fn defaults() {
        let config = ProviderConfig {
            token: Value::Value("t".into()),
            ..Default::default()
        };
        let settings = config.resolve_with(env(&[])).unwrap();
        assert_eq!(settings.region, DEFAULT_REGION);
        assert_eq!(settings.api_endpoint, DEFAULT_API_ENDPOINT);

        let settings = config
            .resolve_with(env(&[
                (ENV_REGION, "NYC1"),
                (ENV_API_URL, "http://localhost:8080"),
            ]))
            .unwrap();
        assert_eq!(settings.region, "NYC1");
        assert_eq!(settings.api_endpoint, "http://localhost:8080");

        let config = ProviderConfig {
            region: Value::Value("FRA1".into()),
            ..config
        };
        let settings = config
            .resolve_with(env(&[(ENV_REGION, "NYC1")]))
            .unwrap();
        assert_eq!(settings.region, "FRA1");
    }

    #[test]
    fn token_is_redacted() {
        let settings = Settings {
            token: "secret".into(),
            region: "LON1".into(),
            api_endpoint: DEFAULT_API_ENDPOINT.into(),
        };
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn home_expansion() {
        assert_eq!(expand_home("/etc/civo.json"), PathBuf::from("/etc/civo.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/civo.json"), home.join("civo.json"));
        }
    }
}
