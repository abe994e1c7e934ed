//! Jira REST (v2) client
//!
//! Implements the three backend-facing traits over one HTTP client:
//! - [`TicketSource`]: paginated JQL search for pending tickets
//! - [`LoadProber`]: `maxResults=0` search counting a login's open tickets
//! - [`TicketMutator`]: transition and assignment calls, paced by the
//!   injected [`PacingPolicy`]
//!
//! Authentication is a bearer token. No call is retried.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use shared::{Ticket, TicketKey};

use crate::config::{ApiToken, DispatchConfig};
use crate::error::{DispatchError, DispatchResult};
use crate::traits::{LoadProber, PacingPolicy, TicketMutator, TicketSource};

const SEARCH_PATH: &str = "rest/api/2/search";
const TICKET_FIELDS: &str = "summary,description,assignee";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    issues: Vec<IssueDto>,
}

#[derive(Debug, Deserialize)]
struct IssueDto {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    assignee: Option<UserDto>,
}

/// Only `name` is read: the assignee PUT identifies users by name
#[derive(Debug, Deserialize)]
struct UserDto {
    #[serde(default)]
    name: Option<String>,
}

impl From<IssueDto> for Ticket {
    fn from(issue: IssueDto) -> Self {
        let fields = issue.fields;
        Ticket {
            key: TicketKey::new(issue.key),
            subject: fields.summary.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            assignee: fields
                .assignee
                .and_then(|user| user.name)
                .filter(|login| !login.is_empty()),
        }
    }
}

/// Link a human can open to follow up on a ticket
pub fn browse_url(base_url: &Url, key: &str) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    format!("{base}/browse/{key}")
}

/// Quote a value for use inside a JQL string literal
fn jql_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Real Jira client
pub struct JiraClient<P: PacingPolicy> {
    http: reqwest::Client,
    base_url: Url,
    token: ApiToken,
    transition_id: String,
    pending_query: String,
    open_statuses: Vec<String>,
    page_size: u32,
    pacing: P,
}

impl<P: PacingPolicy> JiraClient<P> {
    /// Build a client from validated configuration
    pub fn from_config(config: &DispatchConfig, pacing: P) -> DispatchResult<Self> {
        let backend = &config.backend;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(backend.request_timeout_secs))
            .build()?;

        let mut base_url = config.base_url()?;
        // Url::join drops the last path segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            token: backend.api_token.clone(),
            transition_id: backend.transition_id.trim().to_string(),
            pending_query: backend.pending_query.trim().to_string(),
            open_statuses: backend
                .open_statuses
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            page_size: backend.page_size,
            pacing,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// JQL counting the open tickets of one assignee
    pub fn open_tickets_query(&self, login: &str) -> String {
        let statuses: Vec<String> = self.open_statuses.iter().map(|s| jql_quote(s)).collect();
        format!(
            "assignee = {} AND status IN ({})",
            jql_quote(login),
            statuses.join(", ")
        )
    }

    fn endpoint(&self, path: &str) -> DispatchResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn search(&self, jql: &str, start_at: u64, max_results: u32, fields: &str) -> DispatchResult<SearchResponse> {
        let url = self.endpoint(SEARCH_PATH)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose())
            .query(&[
                ("jql", jql.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", max_results.to_string()),
                ("fields", fields.to_string()),
            ])
            .send()
            .await?;

        let response = ensure_success(response, "search").await?;
        Ok(response.json::<SearchResponse>().await?)
    }
}

/// Turn a non-2xx response into a backend error carrying the body
async fn ensure_success(response: reqwest::Response, operation: &str) -> DispatchResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DispatchError::backend(
        operation,
        format!("HTTP {}: {}", status, body.trim()),
    ))
}

#[async_trait]
impl<P: PacingPolicy> TicketSource for JiraClient<P> {
    async fn fetch_pending_tickets(&self) -> DispatchResult<Vec<Ticket>> {
        let mut tickets = Vec::new();
        let mut start_at = 0u64;

        loop {
            let page = self
                .search(&self.pending_query, start_at, self.page_size, TICKET_FIELDS)
                .await?;
            let received = page.issues.len() as u64;
            debug!(start_at, received, total = page.total, "Fetched search page");

            tickets.extend(page.issues.into_iter().map(Ticket::from));
            start_at += received;

            if received == 0 || start_at >= page.total {
                break;
            }
        }

        info!("Found {} pending tickets", tickets.len());
        Ok(tickets)
    }
}

#[async_trait]
impl<P: PacingPolicy> LoadProber for JiraClient<P> {
    async fn count_open_tickets(&self, login: &str) -> DispatchResult<u64> {
        let jql = self.open_tickets_query(login);
        let page = self.search(&jql, 0, 0, "key").await?;
        debug!(login, open_tickets = page.total, "Probed assignee load");
        Ok(page.total)
    }
}

#[async_trait]
impl<P: PacingPolicy> TicketMutator for JiraClient<P> {
    async fn transition_to_in_progress(&self, key: &str) -> DispatchResult<()> {
        self.pacing.pace().await;

        let url = self.endpoint(&format!("rest/api/2/issue/{key}/transitions"))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(self.token.expose())
            .json(&json!({ "transition": { "id": self.transition_id } }))
            .send()
            .await?;
        ensure_success(response, "transition").await?;

        info!(ticket = key, "Ticket moved to in progress");
        Ok(())
    }

    async fn assign(&self, key: &str, login: &str) -> DispatchResult<()> {
        self.pacing.pace().await;

        let url = self.endpoint(&format!("rest/api/2/issue/{key}/assignee"))?;
        let response = self
            .http
            .put(url)
            .bearer_auth(self.token.expose())
            .json(&json!({ "name": login }))
            .send()
            .await?;
        ensure_success(response, "assign").await?;

        info!(
            ticket = key,
            assignee = login,
            "Ticket assigned (link: {})",
            browse_url(&self.base_url, key)
        );
        Ok(())
    }
}
