/// Job-search provider client (JSearch-style JSON API). Read-only; results
/// are transient and only become rows when the user saves one.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::models::job::JobListing;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    pub employment_type: Option<String>,
    pub remote_only: Option<bool>,
    pub date_posted: Option<String>,
}

pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    data: Option<Vec<RawListing>>,
}

#[derive(Deserialize)]
struct RawListing {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_city: Option<String>,
    job_country: Option<String>,
    job_apply_link: Option<String>,
    job_description: Option<String>,
    job_posted_at_datetime_utc: Option<String>,
}

impl SearchClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.job_search_api_url.clone(),
            api_key: config.job_search_api_key.clone(),
        }
    }

    pub async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<JobListing>> {
        if self.api_key.is_empty() {
            return Err(anyhow!("JOB_SEARCH_API_KEY is not configured"));
        }

        let mut params: Vec<(&str, String)> = vec![("query", query.to_string())];
        if let Some(et) = &filters.employment_type {
            params.push(("employment_types", et.to_uppercase()));
        }
        if filters.remote_only == Some(true) {
            params.push(("work_from_home", "true".to_string()));
        }
        if let Some(dp) = &filters.date_posted {
            params.push(("date_posted", dp.clone()));
        }

        let url = format!("{}/search", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .query(&params)
            .send()
            .await
            .context("job search request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("job search returned {}", resp.status()));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .context("job search response was not valid JSON")?;

        let listings = body
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| {
                // Rows without a stable id or title cannot be tracked; skip them.
                let external_id = raw.job_id?;
                let title = raw.job_title?;
                Some(JobListing {
                    external_id,
                    title,
                    company_name: raw.employer_name.unwrap_or_default(),
                    location: match (raw.job_city, raw.job_country) {
                        (Some(city), Some(country)) => Some(format!("{city}, {country}")),
                        (city, country) => city.or(country),
                    },
                    apply_link: raw.job_apply_link,
                    description: raw.job_description,
                    date_posted: raw.job_posted_at_datetime_utc,
                })
            })
            .collect();

        Ok(listings)
    }
}
