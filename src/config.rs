use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ProfileError, Result};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";
pub const TABLE_VAR: &str = "SUPABASE_PROFILES_TABLE";

pub const DEFAULT_TABLE: &str = "profiles";

/// Connection settings of the Supabase project holding the profiles table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: Url,
    /// Public anon key, sent as `apikey` and default bearer token
    pub key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_owned()
}

impl SupabaseConfig {
    pub fn new<S: Into<String>>(url: Url, key: S) -> Self {
        Self {
            url,
            key: key.into(),
            table: default_table(),
        }
    }

    /// Read the configuration from `SUPABASE_URL`, `SUPABASE_KEY` and the
    /// optional `SUPABASE_PROFILES_TABLE`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            var(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    ProfileError::Config(format!("{name} is not set"))
                })
        };

        let url = Url::parse(&required(URL_VAR)?)?;
        let config = Self {
            url,
            key: required(KEY_VAR)?,
            table: var(TABLE_VAR)
                .filter(|table| !table.is_empty())
                .unwrap_or_else(default_table),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        log::debug!("Loading config from {}", path.as_ref().display());

        let bytes = fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// `{url}/rest/v1/{table}`
    pub fn rest_endpoint(&self) -> Result<Url> {
        let mut endpoint = self.url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| {
                ProfileError::Config(format!("{} cannot be a base", self.url))
            })?
            .pop_if_empty()
            .extend(["rest", "v1", self.table.as_str()]);
        Ok(endpoint)
    }

    fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(ProfileError::Config("empty key".to_owned()));
        }
        if self.table.is_empty() {
            return Err(ProfileError::Config("empty table name".to_owned()));
        }
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(ProfileError::Config(format!(
                "unsupported scheme {}",
                self.url.scheme()
            )));
        }
        Ok(())
    }
}
