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

//! Translation of Civo API error payloads into readable messages

use std::fmt::Display;

use serde::Deserialize;

/// Error payload returned by the Civo API
///
/// The API answers failed requests with a body like
/// `{"code": "database_network_not_found", "reason": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub reason: String,
}

impl ErrorPayload {
    /// Check if the payload designates a missing object
    pub fn is_not_found(&self) -> bool {
        self.code.ends_with("_not_found")
    }
}

impl Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code.is_empty(), self.reason.is_empty()) {
            (false, false) => write!(f, "{} (code: {})", self.reason, self.code),
            (true, _) => f.write_str(&self.reason),
            (false, true) => write!(f, "error code: {}", self.code),
        }
    }
}

/// Extract the error payload embedded in an error message
///
/// The payload is looked up between the first `{` and the last `}` of `text`.
/// Returns [`None`] if there is no such JSON object, or if it carries neither a code nor a reason.
pub fn parse_error_payload(text: &str) -> Option<ErrorPayload> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let payload: ErrorPayload = serde_json::from_str(&text[start..=end]).ok()?;
    if payload.code.is_empty() && payload.reason.is_empty() {
        None
    } else {
        Some(payload)
    }
}

/// Best-effort translation of a backend error message
///
/// Falls back to the message verbatim when no payload can be parsed.
pub fn friendly_message(text: &str) -> String {
    match parse_error_payload(text) {
        Some(payload) => payload.to_string(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_embedded_in_message() {
        let text = r#"Error: 400 Bad Request {"code":"invalid_cidr","reason":"The CIDR is not valid"}"#;
        let payload = parse_error_payload(text).expect("payload");
        assert_eq!(payload.code, "invalid_cidr");
        assert_eq!(payload.reason, "The CIDR is not valid");
        assert_eq!(
            friendly_message(text),
            "The CIDR is not valid (code: invalid_cidr)"
        );
    }

    #[test]
    fn plain_message_is_kept_verbatim() {
        assert_eq!(friendly_message("connection reset"), "connection reset");
        assert_eq!(parse_error_payload("connection reset"), None);
    }

    #[test]
    fn malformed_json_is_kept_verbatim() {
        let text = "unexpected {not json}";
        assert_eq!(friendly_message(text), text);
    }

    #[test]
    fn empty_payload_is_ignored() {
        assert_eq!(parse_error_payload(r#"{"result":"failed"}"#), None);
    }

    #[test]
    fn code_only() {
        assert_eq!(
            friendly_message(r#"{"code":"database_network_not_found"}"#),
            "error code: database_network_not_found"
        );
        assert!(parse_error_payload(r#"{"code":"database_network_not_found"}"#)
            .unwrap()
            .is_not_found());
    }
}
