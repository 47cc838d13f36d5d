//! Stored portal credentials, keyed by insurance site key.
//!
//! Credentials are provisioned out of band (environment variables in
//! the current deployment) and looked up at job-start time. A missing
//! entry for a requested site is surfaced to the caller as 404.

use std::collections::HashMap;

/// Login credentials for one insurance portal.
#[derive(Clone)]
pub struct SiteCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SiteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// In-memory credential lookup, keyed by upper-case site key.
#[derive(Debug, Default)]
pub struct CredentialStore {
    sites: HashMap<String, SiteCredentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register credentials for a site key (normalized to upper-case).
    pub fn insert(&mut self, site_key: impl Into<String>, credentials: SiteCredentials) {
        self.sites
            .insert(site_key.into().to_uppercase(), credentials);
    }

    /// Look up credentials for a site key (case-insensitive).
    pub fn get(&self, site_key: &str) -> Option<&SiteCredentials> {
        self.sites.get(&site_key.to_uppercase())
    }

    /// Number of provisioned sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Load credentials from environment variables.
    ///
    /// Scans for `SITE_<KEY>_USERNAME` / `SITE_<KEY>_PASSWORD` pairs,
    /// e.g. `SITE_MH_USERNAME` + `SITE_MH_PASSWORD` provisions the
    /// `MH` site. Keys with only one half of the pair are skipped.
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let mut store = Self::new();

        for (name, username) in &vars {
            let Some(key) = name
                .strip_prefix("SITE_")
                .and_then(|rest| rest.strip_suffix("_USERNAME"))
            else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            let Some(password) = vars.get(&format!("SITE_{key}_PASSWORD")) else {
                continue;
            };
            store.insert(
                key,
                SiteCredentials {
                    username: username.clone(),
                    password: password.clone(),
                },
            );
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut store = CredentialStore::new();
        store.insert(
            "mh",
            SiteCredentials {
                username: "user".into(),
                password: "pass".into(),
            },
        );

        assert!(store.get("MH").is_some());
        assert!(store.get("mh").is_some());
        assert!(store.get("DDMA").is_none());
    }

    #[test]
    fn debug_output_redacts_password() {
        let credentials = SiteCredentials {
            username: "user".into(),
            password: "pass".into(),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("pass\""));
        assert!(rendered.contains("<redacted>"));
    }
}
