//! Contract configuration loaded from the environment.

use std::collections::BTreeSet;

use eggtrack_auth::IdentityResolver;

use crate::query::CapMode;

pub const ADMIN_SUBJECTS_VAR: &str = "EGGTRACK_ADMIN_SUBJECTS";
pub const QUERY_CAP_VAR: &str = "EGGTRACK_QUERY_CAP";

const DEFAULT_ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// Subjects treated as ledger administrators.
    pub admin_subjects: BTreeSet<String>,
    /// What the `max` cap of selector queries counts.
    pub query_cap: CapMode,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            admin_subjects: BTreeSet::from([DEFAULT_ADMIN_SUBJECT.to_string()]),
            query_cap: CapMode::default(),
        }
    }
}

impl ContractConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unknown or empty values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let admin_subjects = match lookup(ADMIN_SUBJECTS_VAR) {
            Some(raw) => {
                let parsed: BTreeSet<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if parsed.is_empty() {
                    tracing::warn!(
                        var = ADMIN_SUBJECTS_VAR,
                        "no admin subjects configured; using default"
                    );
                    defaults.admin_subjects
                } else {
                    parsed
                }
            }
            None => defaults.admin_subjects,
        };

        let query_cap = match lookup(QUERY_CAP_VAR) {
            Some(raw) => raw.parse::<CapMode>().unwrap_or_else(|err| {
                tracing::warn!(
                    var = QUERY_CAP_VAR,
                    error = %err,
                    "falling back to default query cap mode"
                );
                defaults.query_cap
            }),
            None => defaults.query_cap,
        };

        Self {
            admin_subjects,
            query_cap,
        }
    }

    pub fn with_query_cap(mut self, mode: CapMode) -> Self {
        self.query_cap = mode;
        self
    }

    pub fn identity_resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.admin_subjects.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = ContractConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ContractConfig::default());
        assert!(config.identity_resolver().is_admin_subject("admin"));
    }

    #[test]
    fn reads_admin_list_and_cap_mode() {
        let config = ContractConfig::from_lookup(lookup(&[
            (ADMIN_SUBJECTS_VAR, " root, ops ,"),
            (QUERY_CAP_VAR, "matched"),
        ]));
        assert_eq!(config.admin_subjects.len(), 2);
        assert!(config.admin_subjects.contains("ops"));
        assert_eq!(config.query_cap, CapMode::Matched);
    }

    #[test]
    fn unknown_cap_mode_falls_back() {
        let config = ContractConfig::from_lookup(lookup(&[(QUERY_CAP_VAR, "sometimes")]));
        assert_eq!(config.query_cap, CapMode::Scanned);
    }
}
