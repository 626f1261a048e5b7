//! HTTP client for the calendar service (Microsoft Graph API).
//!
//! Thin consumer of the core's wire mapper: every payload in either
//! direction goes through `ocal_core::wire`. No retries here; a failed
//! request surfaces as an error with the service's own message.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use ocal_core::config::GlobalConfig;
use ocal_core::event::Event;
use ocal_core::wire::{WireEvent, from_wire, to_wire};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

const BASE_URL: &str = "https://graph.microsoft.com/v1.0";

pub struct GraphClient {
    http: reqwest::Client,
    token: String,
    calendar_id: Option<String>,
}

#[derive(Deserialize)]
struct ListResponse {
    value: Vec<WireEvent>,
}

impl GraphClient {
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        let token = config.resolved_token().context(
            "no access token configured. Run 'ocal configure' or export OCAL_TOKEN",
        )?;

        Ok(GraphClient {
            http: reqwest::Client::new(),
            token,
            calendar_id: config.calendar_id.clone(),
        })
    }

    fn calendar_path(&self) -> String {
        match &self.calendar_id {
            Some(id) => format!("{}/me/calendars/{}", BASE_URL, id),
            None => format!("{}/me/calendar", BASE_URL),
        }
    }

    /// Events overlapping [from, to), optionally filtered by search text.
    pub async fn list_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        query: Option<&str>,
    ) -> Result<Vec<Event>> {
        let url = format!("{}/calendarView", self.calendar_path());
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("startDateTime", from.to_rfc3339()),
                ("endDateTime", to.to_rfc3339()),
                ("$orderby", "start/dateTime".to_string()),
            ]);

        if let Some(text) = query {
            request = request
                .query(&[("$search", format!("\"{}\"", text))])
                .header("ConsistencyLevel", "eventual");
        }

        let response = check(request.send().await?).await?;
        let list: ListResponse = response.json().await.context("unreadable event list")?;

        list.value
            .into_iter()
            .map(|wire| from_wire(wire).map_err(Into::into))
            .collect()
    }

    pub async fn get_event(&self, id: &str) -> Result<Event> {
        let url = format!("{}/events/{}", self.calendar_path(), id);
        let response = check(self.http.get(&url).bearer_auth(&self.token).send().await?).await?;
        let wire: WireEvent = response.json().await.context("unreadable event")?;
        Ok(from_wire(wire)?)
    }

    pub async fn create_event(&self, event: &Event) -> Result<Event> {
        let url = format!("{}/events", self.calendar_path());
        let response = check(
            self.http
                .post(&url)
                .bearer_auth(&self.token)
                .json(&to_wire(event))
                .send()
                .await?,
        )
        .await?;

        let wire: WireEvent = response.json().await.context("unreadable created event")?;
        Ok(from_wire(wire)?)
    }

    /// Replace the event's fields with the given value. The event must
    /// carry the service-assigned id.
    pub async fn update_event(&self, event: &Event) -> Result<Event> {
        let id = event
            .id
            .as_deref()
            .context("cannot update an event without an id")?;

        let url = format!("{}/events/{}", self.calendar_path(), id);
        let response = check(
            self.http
                .patch(&url)
                .bearer_auth(&self.token)
                .json(&to_wire(event))
                .send()
                .await?,
        )
        .await?;

        let wire: WireEvent = response.json().await.context("unreadable updated event")?;
        Ok(from_wire(wire)?)
    }

    pub async fn delete_event(&self, id: &str) -> Result<()> {
        let url = format!("{}/events/{}", self.calendar_path(), id);
        check(self.http.delete(&url).bearer_auth(&self.token).send().await?).await?;
        Ok(())
    }
}

/// Map service status codes to user-facing errors.
async fn check(response: Response) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => {
            bail!("authentication failed. Run 'ocal configure' with a fresh token")
        }
        StatusCode::NOT_FOUND => bail!("event not found"),
        status => {
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("service request failed: {} - {}", status, detail)
        }
    }
}
