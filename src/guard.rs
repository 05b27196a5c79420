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

//! Plan-time checks on attribute changes
//!
//! These checks are purely local: they run before any call to the API.

use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics};

#[macro_export]
/// List the changes of some attributes between two states
///
/// Expands to an array of `(name, changed)` pairs, to be given to
/// [`check_immutable`](crate::guard::check_immutable) or
/// [`replacements`](crate::guard::replacements).
///
/// ```
/// # use terraform_provider_civo::changes;
/// # use tf_provider::value::Value;
/// struct State { label: Value<String>, region: Value<String> }
/// let prior = State { label: Value::Value("a".into()), region: Value::Value("LON1".into()) };
/// let proposed = State { label: Value::Value("b".into()), region: Value::Value("LON1".into()) };
/// assert_eq!(changes!(prior, proposed; label, region), [("label", true), ("region", false)]);
/// ```
macro_rules! changes {
    ($prior:expr, $proposed:expr; $($field:ident),* $(,)?) => {
        [$(
            (
                stringify!($field),
                $crate::guard::has_changed(&$prior.$field, &$proposed.$field),
            )
        ),*]
    };
}

/// Check if an attribute changed between the prior and the proposed state
///
/// An unknown proposed value counts as a change.
pub fn has_changed<T: PartialEq>(prior: &Value<T>, proposed: &Value<T>) -> bool {
    proposed.is_unknown() || prior != proposed
}

/// Check if the identifier designates an existing remote object
pub fn exists(id: &Value<String>) -> bool {
    matches!(id, Value::Value(id) if !id.is_empty())
}

/// Reject the changes of immutable attributes on an existing object
///
/// New objects (null or empty `id`) are never rejected.
/// Returns `false` iff an error has been added to `diags`.
pub fn check_immutable<I>(diags: &mut Diagnostics, id: &Value<String>, changes: I) -> bool
where
    I: IntoIterator<Item = (&'static str, bool)>,
{
    if !exists(id) {
        return true;
    }
    let mut accepted = true;
    for (name, changed) in changes {
        if changed {
            diags.error(
                format!("the '{name}' field is immutable"),
                format!(
                    "`{name}` cannot be changed once the resource is created. Restore its previous value, or replace the resource."
                ),
                AttributePath::new(name),
            );
            accepted = false;
        }
    }
    accepted
}

/// Attribute paths of the changed attributes that force a replacement
pub fn replacements<I>(changes: I) -> Vec<AttributePath>
where
    I: IntoIterator<Item = (&'static str, bool)>,
{
    changes
        .into_iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| AttributePath::new(name))
        .collect()
}
