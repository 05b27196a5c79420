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

use tf_provider::Diagnostics;

use crate::client::ApiError;
use crate::convergence::ConvergenceError;

/// Report a failed API call
pub(crate) fn api_error(diags: &mut Diagnostics, summary: String, err: &ApiError) {
    tracing::error!(error = %err, "{summary}");
    diags.root_error(summary, err.friendly());
}

/// Report a failed deletion
///
/// A timeout is reported with its own summary: the object may still be deleted later on.
pub(crate) fn delete_error(
    diags: &mut Diagnostics,
    kind: &str,
    id: &str,
    err: &ConvergenceError<ApiError>,
) {
    match err {
        ConvergenceError::Timeout { elapsed, phase } => {
            tracing::error!(kind, id, ?elapsed, %phase, "deletion timed out");
            diags.root_error(
                format!("Timed out waiting for the {kind} {id} to be deleted"),
                format!(
                    "The {kind} was still {phase} after {}s. The deletion may still be in progress remotely: check the {kind} before retrying.",
                    elapsed.as_secs()
                ),
            );
        }
        ConvergenceError::Delete(err) => {
            api_error(diags, format!("Failed to delete the {kind} {id}"), err)
        }
        ConvergenceError::Check(err) => api_error(
            diags,
            format!("Failed to check the deletion of the {kind} {id}"),
            err,
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::convergence::DeletePhase;

    #[test]
    fn timeout_is_distinct() {
        let mut diags = Diagnostics::default();
        delete_error(
            &mut diags,
            "network",
            "net-1",
            &ConvergenceError::Timeout {
                elapsed: Duration::from_secs(3600),
                phase: DeletePhase::Deleting,
            },
        );
        assert_eq!(
            diags.errors[0].summary,
            "Timed out waiting for the network net-1 to be deleted"
        );
        assert!(diags.errors[0].detail.contains("may still be in progress"));

        let mut diags = Diagnostics::default();
        delete_error(
            &mut diags,
            "network",
            "net-1",
            &ConvergenceError::Delete(ApiError::from_response(
                500,
                r#"{"code":"boom","reason":"Internal failure"}"#.to_owned(),
            )),
        );
        assert_eq!(diags.errors[0].summary, "Failed to delete the network net-1");
        assert!(diags.errors[0]
            .detail
            .starts_with("Internal failure (code: boom) (HTTP 500)"));
    }
}
