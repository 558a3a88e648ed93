//! Workspace selection
//!
//! Filters the discovered workspace list by the configured exclusion set and
//! optional name filters. Selection never reorders: discovery order is what
//! the orchestrator builds in.

use std::collections::HashSet;

use super::Workspace;

/// Select workspaces to build. Excluded manifest names are dropped; when
/// `name_filters` is non-empty only workspaces whose location contains at
/// least one filter string are kept.
pub fn select<'a>(
    workspaces: &'a [Workspace],
    excluded: &HashSet<String>,
    name_filters: &[String],
) -> Vec<&'a Workspace> {
    workspaces
        .iter()
        .filter(|ws| !excluded.contains(&ws.manifest.name))
        .filter(|ws| {
            name_filters.is_empty()
                || name_filters
                    .iter()
                    .any(|filter| ws.location.contains(filter.as_str()))
        })
        .collect()
}
