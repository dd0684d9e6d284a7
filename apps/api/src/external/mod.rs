//! External job search: the adapter over the Adzuna search API.
//!
//! Results are normalized into `ExternalJob`. When credentials are not
//! configured the adapter serves a fixed demo payload instead of calling out.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ExternalJobsConfig;

pub mod demo;
pub mod handlers;

/// Values shipped in `.env.example`; treated the same as "not configured".
pub const PLACEHOLDER_APP_ID: &str = "your_adzuna_app_id";
pub const PLACEHOLDER_APP_KEY: &str = "your_adzuna_app_key";

pub const SALARY_NOT_DISCLOSED: &str = "Not disclosed";
const UNKNOWN_COMPANY: &str = "Unknown company";
const UNKNOWN_LOCATION: &str = "Location not specified";

#[derive(Debug, Error)]
pub enum ExternalJobsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Adzuna,
    Demo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalJobsQuery {
    pub what: Option<String>,
    #[serde(rename = "where")]
    pub location: Option<String>,
    pub page: Option<u32>,
}

/// A third-party posting in the shape the frontend lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalJob {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub url: Option<String>,
    pub posted_at: Option<String>,
    pub contract_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExternalJobsResponse {
    pub count: u64,
    pub page: u32,
    pub source: ResultSource,
    pub results: Vec<ExternalJob>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdzunaSearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<AdzunaJob>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdzunaJob {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub company: Option<DisplayName>,
    #[serde(default)]
    pub location: Option<DisplayName>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub contract_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DisplayName {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone)]
pub struct ExternalJobsClient {
    client: Client,
    config: ExternalJobsConfig,
}

impl ExternalJobsClient {
    pub fn new(config: ExternalJobsConfig) -> Result<Self, ExternalJobsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// `(app_id, app_key)` when both are set to something other than the
    /// shipped placeholders.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let app_id = self.config.app_id.as_deref()?;
        let app_key = self.config.app_key.as_deref()?;
        if app_id == PLACEHOLDER_APP_ID || app_key == PLACEHOLDER_APP_KEY {
            return None;
        }
        Some((app_id, app_key))
    }

    /// Searches the external API, or returns the demo payload when no
    /// credentials are configured. Single attempt, no retries.
    pub async fn fetch_jobs(
        &self,
        query: &ExternalJobsQuery,
    ) -> Result<ExternalJobsResponse, ExternalJobsError> {
        let page = query.page.unwrap_or(1);

        let Some((app_id, app_key)) = self.credentials() else {
            warn!("External job search credentials not configured; serving demo results");
            return Ok(demo::demo_response(page));
        };

        let url = format!(
            "{}/jobs/{}/search/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.country,
            page
        );
        let results_per_page = self.config.results_per_page.to_string();
        let mut params = vec![
            ("app_id", app_id),
            ("app_key", app_key),
            ("results_per_page", results_per_page.as_str()),
            ("content-type", "application/json"),
        ];
        if let Some(what) = query.what.as_deref().filter(|w| !w.trim().is_empty()) {
            params.push(("what", what));
        }
        if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
            params.push(("where", location));
        }

        // The request URL carries the credentials; strip it from transport errors.
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| ExternalJobsError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExternalJobsError::Http(e.without_url()))?;

        if !status.is_success() {
            return Err(ExternalJobsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: AdzunaSearchResponse = serde_json::from_str(&body)?;
        debug!(
            "External job search returned {} of {} results",
            parsed.results.len(),
            parsed.count
        );

        Ok(ExternalJobsResponse {
            count: parsed.count,
            page,
            source: ResultSource::Adzuna,
            results: parsed.results.into_iter().map(normalize_job).collect(),
        })
    }
}

/// Maps one Adzuna result into the internal display shape.
pub(crate) fn normalize_job(job: AdzunaJob) -> ExternalJob {
    let display = |name: Option<DisplayName>, fallback: &str| {
        name.and_then(|n| n.display_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };

    ExternalJob {
        id: match job.id {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        },
        title: job.title.unwrap_or_default(),
        company: display(job.company, UNKNOWN_COMPANY),
        location: display(job.location, UNKNOWN_LOCATION),
        salary: format_salary(job.salary_min, job.salary_max),
        description: job.description.unwrap_or_default(),
        url: job.redirect_url,
        posted_at: job.created,
        contract_time: job.contract_time,
    }
}

pub fn format_salary(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if (min - max).abs() < f64::EPSILON => format!("{min:.0}"),
        (Some(min), Some(max)) => format!("{min:.0} - {max:.0}"),
        (Some(min), None) => format!("From {min:.0}"),
        (None, Some(max)) => format!("Up to {max:.0}"),
        (None, None) => SALARY_NOT_DISCLOSED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(app_id: Option<&str>, app_key: Option<&str>) -> ExternalJobsClient {
        ExternalJobsClient::new(ExternalJobsConfig {
            app_id: app_id.map(String::from),
            app_key: app_key.map(String::from),
            // unroutable, so any accidental network call fails loudly
            base_url: "http://127.0.0.1:9".to_string(),
            ..ExternalJobsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_salary_range() {
        assert_eq!(format_salary(Some(300000.0), Some(600000.0)), "300000 - 600000");
    }

    #[test]
    fn test_salary_missing_is_not_disclosed() {
        assert_eq!(format_salary(None, None), "Not disclosed");
    }

    #[test]
    fn test_salary_single_bound() {
        assert_eq!(format_salary(Some(500000.0), None), "From 500000");
        assert_eq!(format_salary(None, Some(900000.0)), "Up to 900000");
    }

    #[test]
    fn test_normalize_maps_display_names() {
        let raw: AdzunaSearchResponse = serde_json::from_value(serde_json::json!({
            "count": 1,
            "results": [{
                "id": "4312",
                "title": "Backend Engineer",
                "description": "Rust services",
                "redirect_url": "https://www.adzuna.in/details/4312",
                "created": "2026-10-01T10:00:00Z",
                "company": {"display_name": "Initech"},
                "location": {"display_name": "Pune, Maharashtra"},
                "salary_min": 800000,
                "salary_max": 1200000
            }]
        }))
        .unwrap();

        let job = normalize_job(raw.results.into_iter().next().unwrap());
        assert_eq!(job.id, "4312");
        assert_eq!(job.company, "Initech");
        assert_eq!(job.location, "Pune, Maharashtra");
        assert_eq!(job.salary, "800000 - 1200000");
        assert_eq!(job.url.as_deref(), Some("https://www.adzuna.in/details/4312"));
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let job = normalize_job(AdzunaJob {
            id: Some(serde_json::json!(77)),
            ..AdzunaJob::default()
        });
        assert_eq!(job.id, "77");
        assert_eq!(job.company, "Unknown company");
        assert_eq!(job.location, "Location not specified");
        assert_eq!(job.salary, SALARY_NOT_DISCLOSED);
    }

    #[test]
    fn test_placeholder_credentials_count_as_unset() {
        assert!(client_with(None, None).credentials().is_none());
        assert!(client_with(Some("id"), None).credentials().is_none());
        assert!(client_with(Some(PLACEHOLDER_APP_ID), Some(PLACEHOLDER_APP_KEY))
            .credentials()
            .is_none());
        assert_eq!(
            client_with(Some("id"), Some("key")).credentials(),
            Some(("id", "key"))
        );
    }

    #[tokio::test]
    async fn test_unset_credentials_serve_demo_payload() {
        let client = client_with(None, None);
        let response = client
            .fetch_jobs(&ExternalJobsQuery::default())
            .await
            .unwrap();
        assert_eq!(response.source, ResultSource::Demo);
        assert_eq!(response.count, 5);
        assert_eq!(response.results.len(), 2);

        let again = client
            .fetch_jobs(&ExternalJobsQuery::default())
            .await
            .unwrap();
        assert_eq!(again.results, response.results);
    }

    #[tokio::test]
    async fn test_network_failure_is_an_error() {
        let client = client_with(Some("id"), Some("key"));
        let err = client
            .fetch_jobs(&ExternalJobsQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExternalJobsError::Http(_)));
    }

    #[tokio::test]
    async fn test_transport_error_omits_credentials() {
        let client = client_with(Some("acct-7731"), Some("SECRETKEY123"));
        let err = client
            .fetch_jobs(&ExternalJobsQuery::default())
            .await
            .unwrap_err();
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains("SECRETKEY123"));
        assert!(!rendered.contains("acct-7731"));
    }
}
