/// Gmail REST API client (users/me messages list + get, bearer auth).
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{FetchedMessage, MailError, MailProvider};

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

pub struct GmailMailApi {
    http: reqwest::Client,
    base_url: String,
}

impl GmailMailApi {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }
}

impl Default for GmailMailApi {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ListResponse {
    messages: Option<Vec<MessageRef>>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    id: String,
    internal_date: Option<String>,
    payload: Option<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    mime_type: Option<String>,
    headers: Option<Vec<Header>>,
    body: Option<PartBody>,
    parts: Option<Vec<Part>>,
}

#[derive(Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Deserialize)]
struct PartBody {
    data: Option<String>,
}

#[async_trait]
impl MailProvider for GmailMailApi {
    async fn list_message_ids(
        &self,
        access_token: &str,
        query: &str,
        max: u32,
    ) -> Result<Vec<String>, MailError> {
        let url = format!("{}/users/me/messages", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("q", query), ("maxResults", &max.to_string())])
            .send()
            .await
            .context("message list request failed")?;

        check_auth(resp.status())?;
        if !resp.status().is_success() {
            return Err(anyhow!("message list returned {}", resp.status()).into());
        }

        let list: ListResponse = resp
            .json()
            .await
            .context("message list response was not valid JSON")?;

        Ok(list
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect())
    }

    async fn get_message(&self, access_token: &str, id: &str) -> Result<FetchedMessage, MailError> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("format", "full")])
            .send()
            .await
            .with_context(|| format!("fetch of message {id} failed"))?;

        check_auth(resp.status())?;
        if !resp.status().is_success() {
            return Err(anyhow!("message fetch returned {}", resp.status()).into());
        }

        let msg: MessageResponse = resp
            .json()
            .await
            .with_context(|| format!("message {id} was not valid JSON"))?;

        let (subject, sender) = msg
            .payload
            .as_ref()
            .map(|p| (find_header(p, "Subject"), find_header(p, "From")))
            .unwrap_or_default();

        let body = msg
            .payload
            .as_ref()
            .map(extract_body)
            .unwrap_or_default();

        let timestamp = msg
            .internal_date
            .as_deref()
            .and_then(|ms| ms.parse::<i64>().ok())
            .map(|ms| ms / 1000)
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        Ok(FetchedMessage {
            id: msg.id,
            subject,
            sender,
            body,
            timestamp,
        })
    }
}

fn check_auth(status: StatusCode) -> Result<(), MailError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(MailError::Unauthorized);
    }
    Ok(())
}

fn find_header(part: &Part, name: &str) -> String {
    part.headers
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

/// Best-effort plaintext body: prefer a text/plain part anywhere in the
/// tree, fall back to text/html, empty string when neither decodes.
fn extract_body(payload: &Part) -> String {
    extract_mime(payload, "text/plain")
        .or_else(|| extract_mime(payload, "text/html"))
        .unwrap_or_default()
}

fn extract_mime(part: &Part, mime: &str) -> Option<String> {
    if part.mime_type.as_deref() == Some(mime) {
        if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
            if let Some(text) = decode_part_data(data) {
                return Some(text);
            }
        }
    }

    let mut combined = String::new();
    for child in part.parts.as_deref().unwrap_or_default() {
        if let Some(text) = extract_mime(child, mime) {
            combined.push_str(&text);
        }
    }
    (!combined.is_empty()).then_some(combined)
}

/// Gmail serves part data base64url-encoded, usually unpadded; some relays
/// pad it anyway, so try both alphabets before giving up.
fn decode_part_data(data: &str) -> Option<String> {
    let trimmed = data.trim();
    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| general_purpose::URL_SAFE.decode(trimmed))
        .or_else(|_| general_purpose::STANDARD.decode(trimmed))
        .ok()?;
    String::from_utf8(decoded).ok()
}
