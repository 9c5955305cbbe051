//! HTTP client for the bets engine API

use super::create::NewBet;
use super::error::{ApiError, Result};
use super::types::{Bet, BetId, BetState, BetsPage};
use crate::config::BetsConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Value of the `status` field on successful responses
const STATUS_OK: &str = "ok";

/// Default upper bound on pages fetched for one listing
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Longest response body quoted in an error message
const MAX_ERROR_BODY: usize = 200;

/// Bets engine API client
///
/// Generate a token through the admin UI, then:
///
/// ```rust,ignore
/// let api = BetsApi::new(BetsConfig::with_token("<your token>"))?;
/// let bets = api.fetch_active().await?;
/// ```
#[derive(Clone)]
pub struct BetsApi {
    base_url: Url,
    token: String,
    timeout_secs: u64,
    max_pages: usize,
    client: Client,
}

impl BetsApi {
    /// Create a client from configuration
    pub fn new(config: BetsConfig) -> Result<Self> {
        let base_url = Url::parse(&config.bets_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.bets_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            token: config.token,
            timeout_secs: config.timeout_secs,
            max_pages: DEFAULT_MAX_PAGES,
            client,
        })
    }

    /// Fail listings that need more than `max_pages` pages
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// All bets in a fresh, active or accept_end state
    pub async fn fetch_active(&self) -> Result<Vec<Bet>> {
        let states: Vec<&str> = BetState::ACTIVE.iter().map(BetState::as_str).collect();
        let url = self.url(&format!("bets?state={}", states.join(",")))?;

        let bets = self.fetch_all(url).await?;
        info!("Fetched {} active bets", bets.len());
        Ok(bets)
    }

    /// Current records for the given bet ids
    ///
    /// Ids unknown to the server are simply absent from the result.
    pub async fn fetch_by_ids(&self, ids: &[BetId]) -> Result<Vec<Bet>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let url = self.url(&format!("bets?id={}", ids.join(",")))?;

        let bets = self.fetch_all(url).await?;
        debug!("Fetched {} of {} requested bets", bets.len(), ids.len());
        Ok(bets)
    }

    /// Create a bet and return it as stored by the engine
    pub async fn create(&self, new_bet: &NewBet) -> Result<Bet> {
        let form = new_bet.to_form()?;
        let url = self.url("bets")?;

        debug!("POST {} ({} bet, {} fields)", url, new_bet.bet_type(), form.len());

        let json = self.request(self.client.post(url).form(&form)).await?;
        let bet = json
            .get("bet")
            .cloned()
            .ok_or_else(|| ApiError::UnexpectedResponse(truncate(&json.to_string())))?;

        let bet: Bet =
            serde_json::from_value(bet).map_err(|e| ApiError::Deserialize(e.to_string()))?;

        info!("Created {} bet {}", new_bet.bet_type(), bet.id);
        Ok(bet)
    }

    /// Fetch a listing, following `next` links until exhausted
    ///
    /// A listing still linking to more pages after `max_pages` fails with
    /// [`ApiError::TooManyPages`] rather than returning partial results.
    async fn fetch_all(&self, first: Url) -> Result<Vec<Bet>> {
        let mut bets = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages >= self.max_pages {
                warn!("Bets listing exceeds {} pages, giving up", self.max_pages);
                return Err(ApiError::TooManyPages(self.max_pages));
            }
            pages += 1;

            debug!("GET {}", url);

            let json = self.request(self.client.get(url)).await?;
            let page = json
                .get("bets")
                .cloned()
                .ok_or_else(|| ApiError::UnexpectedResponse(truncate(&json.to_string())))?;

            let page: BetsPage =
                serde_json::from_value(page).map_err(|e| ApiError::Deserialize(e.to_string()))?;

            bets.extend(page.results);

            next = match page.next {
                Some(link) if !link.is_empty() => Some(self.url(&link)?),
                _ => None,
            };
        }

        Ok(bets)
    }

    /// Send an authenticated request and return the JSON body of a
    /// successful response
    async fn request(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        let json: Value =
            serde_json::from_str(&body).map_err(|_| ApiError::NotJson(truncate(&body)))?;

        if json.get("status").and_then(Value::as_str) != Some(STATUS_OK) {
            return Err(ApiError::UnexpectedResponse(truncate(&json.to_string())));
        }

        Ok(json)
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            ApiError::Transport(error)
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }
}

impl std::fmt::Debug for BetsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BetsApi")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
