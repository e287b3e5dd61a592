use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{EventFilter, EventSource, SourceError};
use crate::models::draft::EventDraft;
use crate::models::event::Event;
use crate::models::registration::Registration;
use crate::models::settings::Settings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// One page of events plus whatever paging metadata the backend sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub items: Vec<Event>,
    pub page: Option<u32>,
    pub total: Option<u64>,
}

/// Client for the campus event backend.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build event API HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Self::new(&settings.api_base_url)?;
        Ok(match &settings.api_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    /// Bearer token for admin and registration endpoints.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn fetch_page(&self, filter: &EventFilter) -> Result<EventPage, SourceError> {
        let url = self.endpoint(&["api", "events"], &filter.query_pairs())?;
        let body = self.send(self.client.get(url), "events").await?;
        parse_event_page(&body)
    }

    pub async fn search(&self, query: &str, page: u32, limit: u32) -> Result<EventPage, SourceError> {
        let mut pairs = Vec::new();
        if !query.trim().is_empty() {
            pairs.push(("q", query.trim().to_string()));
        }
        pairs.push(("page", page.max(1).to_string()));
        pairs.push(("limit", limit.max(1).to_string()));

        let url = self.endpoint(&["api", "events", "search"], &pairs)?;
        let body = self.send(self.client.get(url), "search results").await?;
        parse_event_page(&body)
    }

    pub async fn get(&self, id: &str) -> Result<Event, SourceError> {
        let url = self.endpoint(&["api", "events", id], &[])?;
        let body = self.send(self.client.get(url), &format!("event {}", id)).await?;
        parse_data(&body)
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<Event, SourceError> {
        let url = self.endpoint(&["api", "events"], &[])?;
        let request = self.client.post(url).json(&draft.to_payload());
        let body = self.send(request, "new event").await?;
        parse_data(&body)
    }

    pub async fn update(&self, id: &str, draft: &EventDraft) -> Result<Event, SourceError> {
        let url = self.endpoint(&["api", "events", id], &[])?;
        let request = self.client.put(url).json(&draft.to_payload());
        let body = self.send(request, &format!("event {}", id)).await?;
        parse_data(&body)
    }

    pub async fn delete(&self, id: &str) -> Result<(), SourceError> {
        let url = self.endpoint(&["api", "events", id], &[])?;
        self.send(self.client.delete(url), &format!("event {}", id)).await?;
        Ok(())
    }

    /// Registrations of the user the token belongs to.
    pub async fn my_registrations(&self) -> Result<Vec<Registration>, SourceError> {
        let url = self.endpoint(&["api", "registrations", "me"], &[])?;
        let body = self.send(self.client.get(url), "registrations").await?;
        parse_list(&body)
    }

    pub async fn event_registrations(&self, event_id: &str) -> Result<Vec<Registration>, SourceError> {
        let url = self.endpoint(&["api", "events", event_id, "registrations"], &[])?;
        let body = self
            .send(self.client.get(url), &format!("registrations for event {}", event_id))
            .await?;
        parse_list(&body)
    }

    pub async fn register(&self, event_id: &str) -> Result<Registration, SourceError> {
        let url = self.endpoint(&["api", "events", event_id, "register"], &[])?;
        let body = self
            .send(self.client.post(url), &format!("event {}", event_id))
            .await?;
        parse_data(&body)
    }

    pub async fn cancel_registration(&self, event_id: &str) -> Result<(), SourceError> {
        let url = self.endpoint(&["api", "events", event_id, "registrations"], &[])?;
        self.send(self.client.delete(url), &format!("registration for event {}", event_id))
            .await?;
        Ok(())
    }

    /// Base URL plus percent-encoded path segments, so ids never alter the route.
    fn endpoint(&self, segments: &[&str], pairs: &[(&'static str, String)]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Network(format!("API base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String, SourceError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        log::debug!("API {} -> HTTP {}", what, status);

        check_status(status, &body, what)?;
        Ok(body)
    }
}

#[async_trait]
impl EventSource for ApiClient {
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, SourceError> {
        Ok(self.fetch_page(filter).await?.items)
    }

    async fn get_event(&self, id: &str) -> Result<Event, SourceError> {
        self.get(id).await
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageData {
    Flat(Vec<Event>),
    Paged {
        #[serde(default)]
        items: Vec<Event>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        total: Option<u64>,
    },
}

/// Map a non-success status to an error, preferring the backend's message.
pub(crate) fn check_status(status: u16, body: &str, what: &str) -> Result<(), SourceError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    if status == 404 {
        return Err(SourceError::NotFound(what.to_string()));
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|err| err.message)
        .unwrap_or_else(|| format!("Request for {} failed", what));
    Err(SourceError::Server { status, message })
}

/// Accepts both `{ data: { items: [...] } }` and `{ data: [...] }`.
pub(crate) fn parse_event_page(body: &str) -> Result<EventPage, SourceError> {
    let envelope: Envelope<PageData> = serde_json::from_str(body)?;
    Ok(match envelope.data {
        None => EventPage::default(),
        Some(PageData::Flat(items)) => EventPage {
            items,
            ..EventPage::default()
        },
        Some(PageData::Paged { items, page, total }) => EventPage { items, page, total },
    })
}

/// Parse an exported event list: a bare JSON array or an API response body.
pub fn parse_events(body: &str) -> Result<Vec<Event>, SourceError> {
    match serde_json::from_str::<Vec<Event>>(body) {
        Ok(events) => Ok(events),
        Err(_) => Ok(parse_event_page(body)?.items),
    }
}

fn parse_data<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    envelope
        .data
        .ok_or_else(|| SourceError::Decode("response has no data".to_string()))
}

fn parse_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, SourceError> {
    let envelope: Envelope<Vec<T>> = serde_json::from_str(body)?;
    Ok(envelope.data.unwrap_or_default())
}
