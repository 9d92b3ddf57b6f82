use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::SupabaseConfig;
use crate::profile::{ProfileRecord, PROFILE_COLUMNS};
use crate::service::{expect_single, ProfileService};
use crate::{ProfileError, Result};

/// Enough rows to tell a unique match from a duplicate one.
const ROW_LIMIT: &str = "2";

/// Error object returned by PostgREST on non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

/// [`ProfileService`] backed by the Supabase REST API.
pub struct SupabaseClient {
    http: reqwest::Client,
    endpoint: Url,
    key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let mut header = HeaderMap::new();
        header.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(header)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.rest_endpoint()?,
            key: config.key.clone(),
            access_token: None,
        })
    }

    /// Authorize requests with a user session token instead of the anon key,
    /// so row level security sees the signed-in user.
    pub fn with_access_token<S: Into<String>>(mut self, token: S) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// `GET {endpoint}?select=...&email=eq.{email}&limit=2`
    pub fn query_url(&self, email: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("select", PROFILE_COLUMNS)
            .append_pair("email", &format!("eq.{email}"))
            .append_pair("limit", ROW_LIMIT);
        url
    }
}

impl ProfileService for SupabaseClient {
    async fn fetch_profile(&self, email: &str) -> Result<ProfileRecord> {
        let url = self.query_url(email);
        log::trace!("supabase: GET {}", url);

        let bearer = self
            .access_token
            .as_deref()
            .unwrap_or(&self.key);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.key)
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        parse_response(status, &body)
    }
}

fn parse_response(status: StatusCode, body: &[u8]) -> Result<ProfileRecord> {
    if !status.is_success() {
        let detail = match serde_json::from_slice::<PostgrestError>(body) {
            Ok(PostgrestError {
                code,
                message: Some(message),
            }) => match code {
                Some(code) => format!("{status} {code}: {message}"),
                None => format!("{status}: {message}"),
            },
            _ => status.to_string(),
        };
        return Err(ProfileError::Query(detail));
    }

    let rows: Vec<ProfileRecord> = serde_json::from_slice(body)?;
    log::trace!("supabase: {} rows", rows.len());
    expect_single(rows)
}
