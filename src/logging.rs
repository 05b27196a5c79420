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

//! Process-wide log subscriber
//!
//! Stdout carries the plugin handshake, so logs always go to stderr.
//! When `PLUGIN_LOG_FILE` is set, the plugin server installs its own file subscriber
//! and nothing is done here.

use std::env;

use tracing_subscriber::EnvFilter;

pub const ENV_PLUGIN_LOG_FILE: &str = "PLUGIN_LOG_FILE";
pub const ENV_LOG: &str = "TF_LOG_PROVIDER_CIVO";
pub const ENV_LOG_FORMAT: &str = "TF_LOG_PROVIDER_CIVO_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env(value: Option<&str>) -> Self {
        match value {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

fn filter(directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(directives) if !directives.is_empty() => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        _ => EnvFilter::new("info"),
    }
}

/// Install the stderr subscriber, unless the plugin server logs to a file
pub fn init() {
    if env::var_os(ENV_PLUGIN_LOG_FILE).is_some() {
        return;
    }
    let filter = filter(env::var(ENV_LOG).ok().as_deref());
    let format = LogFormat::from_env(env::var(ENV_LOG_FORMAT).ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed by the host process
    _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
