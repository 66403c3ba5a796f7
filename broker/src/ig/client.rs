//! IG REST API client.

use std::time::Duration;

use igkit::DealingRules;
use log::{debug, info};
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use super::session::{Credentials, Environment, Session};
use super::types::*;
use crate::error::BrokerError;
use crate::history::{Activity, ActivityQuery, PriceAllowance, PriceCandle, PriceResolution, Transaction};
use crate::requests::{
    AmendPositionRequest, ClosePositionRequest, CreateWatchlistRequest, OpenPositionRequest,
};
use crate::types::{
    Account, DealReference, InstrumentDetails, InstrumentSnapshot, MarketInstrument, Position,
    Watchlist, WorkingOrder,
};

/// Blocking IG REST client holding one login session.
pub struct IgClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    session: Option<Session>,
    account: Option<Account>,
    dry_run: bool,
}

impl IgClient {
    /// Create a client. No request is made until [`authenticate`](Self::authenticate).
    pub fn new(
        credentials: Credentials,
        environment: Environment,
        timeout: Duration,
    ) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: environment.base_url().to_string(),
            credentials,
            session: None,
            account: None,
            dry_run: false,
        })
    }

    /// In dry-run mode an account switch is not made the default and no re-login follows.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Log in (POST /session v2) and keep the session tokens.
    pub fn authenticate(&mut self) -> Result<&Account, BrokerError> {
        info!("Logging into \"{}\" account...", self.credentials.identifier);
        let url = format!("{}/session", self.base_url);
        let body = SessionRequest {
            identifier: &self.credentials.identifier,
            password: &self.credentials.password,
        };

        let resp = self
            .client
            .post(&url)
            .header("X-IG-API-KEY", self.credentials.api_key.as_str())
            .header("Version", "2")
            .header("Accept", "application/json; charset=UTF-8")
            .json(&body)
            .send()
            .map_err(|e| BrokerError::Connection(format!("login request failed: {e}")))?;

        if !resp.status().is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(BrokerError::Auth(format!(
                "failed to log into \"{}\": {}",
                self.credentials.identifier,
                error_code(&body)
            )));
        }

        let token = |name: &str| -> Result<Zeroizing<String>, BrokerError> {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| Zeroizing::new(v.to_string()))
                .ok_or_else(|| BrokerError::Auth(format!("login response has no {name} header")))
        };
        let session = Session {
            cst: token("CST")?,
            security_token: token("X-SECURITY-TOKEN")?,
        };

        let account: SessionResponse = resp
            .json()
            .map_err(|e| BrokerError::Parse(format!("failed to parse session: {e}")))?;
        info!(
            "Logged into \"{}\" ({} {})",
            self.credentials.identifier, account.id, account.account_type
        );

        self.session = Some(session);
        Ok(self.account.insert(account))
    }

    pub fn is_logged_in(&self) -> bool {
        self.account.is_some()
    }

    /// The account returned by the last login.
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Switch the active account (PUT /session v1), then log in again unless dry-run.
    pub fn switch_account(&mut self, account_id: &str) -> Result<(), BrokerError> {
        let body = SwitchAccountRequest {
            account_id,
            default_account: !self.dry_run,
        };
        let resp = self.send(Method::PUT, "/session", 1, &[], Some(&body))?;
        check(resp)?;
        info!("Switched active account to {account_id}");
        if !self.dry_run {
            self.authenticate()?;
        }
        Ok(())
    }

    // ========================================================================
    // Markets
    // ========================================================================

    /// All markets matching a search term (GET /markets v1).
    pub fn search_markets(&self, term: &str) -> Result<Vec<MarketInstrument>, BrokerError> {
        let query = [("searchTerm", term.to_string())];
        let resp: MarketsResponse = self.get("/markets", 1, &query)?;
        Ok(resp.markets)
    }

    /// Remaining historical-price allowance, read from a one-candle request on `epic`.
    pub fn price_allowance(&self, epic: &str) -> Result<PriceAllowance, BrokerError> {
        let query = [
            ("resolution", PriceResolution::Day.to_string()),
            ("max", "1".to_string()),
        ];
        let resp: PricesResponse = self.get(&format!("/prices/{epic}"), 3, &query)?;
        resp.metadata
            .map(|m| m.allowance)
            .ok_or_else(|| BrokerError::Parse("price response has no allowance metadata".into()))
    }

    /// Candles between two dates (`yyyy-MM-ddTHH:mm:ss`), GET /prices/{epic} v3.
    pub fn historical_prices(
        &self,
        epic: &str,
        resolution: PriceResolution,
        from: &str,
        to: &str,
    ) -> Result<Vec<PriceCandle>, BrokerError> {
        let query = [
            ("resolution", resolution.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("pageSize", "0".to_string()),
        ];
        let resp: PricesResponse = self.get(&format!("/prices/{epic}"), 3, &query)?;
        Ok(resp.prices)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Account activity (GET /history/activity v3).
    pub fn activity(&self, query: &ActivityQuery) -> Result<Vec<Activity>, BrokerError> {
        let resp: ActivityResponse = self.get("/history/activity", 3, &query.to_query())?;
        Ok(resp.activities)
    }

    /// Transactions in a date range, optionally of one type (e.g. `DEPOSIT`, `ALL`).
    pub fn transactions(
        &self,
        from: &str,
        to: Option<&str>,
        transaction_type: Option<&str>,
    ) -> Result<Vec<Transaction>, BrokerError> {
        let mut query = vec![("from", from.to_string())];
        if let Some(to) = to {
            query.push(("to", to.to_string()));
        }
        if let Some(kind) = transaction_type {
            query.push(("type", kind.to_string()));
        }
        let resp: TransactionsResponse = self.get("/history/transactions", 2, &query)?;
        Ok(resp.transactions)
    }

    // ========================================================================
    // Watchlists
    // ========================================================================

    pub fn watchlists(&self) -> Result<Vec<Watchlist>, BrokerError> {
        let resp: WatchlistsResponse = self.get("/watchlists", 1, &[])?;
        Ok(resp.watchlists)
    }

    /// Markets in the watchlist called `name`.
    pub fn watchlist_markets(&self, name: &str) -> Result<Vec<MarketInstrument>, BrokerError> {
        let watchlist = self.watchlist_by_name(name)?;
        let resp: WatchlistMarketsResponse =
            self.get(&format!("/watchlists/{}", watchlist.id), 1, &[])?;
        Ok(resp.markets)
    }

    /// Create a watchlist, returning its id.
    pub fn create_watchlist(&self, name: &str, epics: &[String]) -> Result<String, BrokerError> {
        let body = CreateWatchlistRequest {
            name: name.to_string(),
            epics: epics.to_vec(),
        };
        let resp = self.send(Method::POST, "/watchlists", 1, &[], Some(&body))?;
        let created: CreateWatchlistResponse = parse(resp)?;
        info!("Created watchlist \"{name}\" ({}): {}", created.watchlist_id, created.status);
        Ok(created.watchlist_id)
    }

    pub fn delete_watchlist(&self, name: &str) -> Result<bool, BrokerError> {
        let watchlist = self.watchlist_by_name(name)?;
        let path = format!("/watchlists/{}", watchlist.id);
        let resp = self.send::<()>(Method::DELETE, &path, 1, &[], None)?;
        let status: StatusResponse = parse(resp)?;
        Ok(status.is_success())
    }

    pub fn add_to_watchlist(&self, name: &str, epic: &str) -> Result<bool, BrokerError> {
        let watchlist = self.watchlist_by_name(name)?;
        let path = format!("/watchlists/{}", watchlist.id);
        let body = WatchlistMarketRequest { epic };
        let resp = self.send(Method::PUT, &path, 1, &[], Some(&body))?;
        let status: StatusResponse = parse(resp)?;
        Ok(status.is_success())
    }

    pub fn remove_from_watchlist(&self, name: &str, epic: &str) -> Result<bool, BrokerError> {
        let watchlist = self.watchlist_by_name(name)?;
        let path = format!("/watchlists/{}/{epic}", watchlist.id);
        let resp = self.send::<()>(Method::DELETE, &path, 1, &[], None)?;
        let status: StatusResponse = parse(resp)?;
        Ok(status.is_success())
    }

    fn watchlist_by_name(&self, name: &str) -> Result<Watchlist, BrokerError> {
        self.watchlists()?
            .into_iter()
            .find(|w| w.name == name)
            .ok_or_else(|| BrokerError::NotFound(format!("watchlist \"{name}\"")))
    }

    // ========================================================================
    // Broker surface (called from the trait impl in `ig::mod`)
    // ========================================================================

    pub(super) fn market_by_search(&self, term: &str) -> Result<MarketInstrument, BrokerError> {
        self.search_markets(term)?
            .into_iter()
            .next()
            .ok_or_else(|| BrokerError::NotFound(format!("no market matches \"{term}\"")))
    }

    pub(super) fn dealing_rules(&self, epic: &str) -> Result<DealingRules, BrokerError> {
        let resp: DealingRulesEnvelope = self.get(&format!("/markets/{epic}"), 3, &[])?;
        Ok(DealingRules::try_from(resp.dealing_rules)?)
    }

    pub(super) fn market(&self, epic: &str) -> Result<MarketInstrument, BrokerError> {
        let resp: MarketEnvelope = self.get(&format!("/markets/{epic}"), 3, &[])?;
        Ok(MarketInstrument::from_parts(resp.instrument, resp.snapshot))
    }

    pub(super) fn market_details(&self, epic: &str) -> Result<InstrumentDetails, BrokerError> {
        let resp: InstrumentEnvelope = self.get(&format!("/markets/{epic}"), 3, &[])?;
        Ok(resp.instrument)
    }

    pub(super) fn market_snapshot(&self, epic: &str) -> Result<InstrumentSnapshot, BrokerError> {
        let resp: SnapshotEnvelope = self.get(&format!("/markets/{epic}"), 3, &[])?;
        Ok(resp.snapshot)
    }

    pub(super) fn open_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let resp: PositionsResponse = self.get("/positions", 2, &[])?;
        Ok(resp.positions.into_iter().map(Position::from).collect())
    }

    pub(super) fn working_orders(&self) -> Result<Vec<WorkingOrder>, BrokerError> {
        let resp: WorkingOrdersResponse = self.get("/workingorders", 2, &[])?;
        Ok(resp.working_orders.into_iter().map(WorkingOrder::from).collect())
    }

    pub(super) fn create_position(
        &self,
        request: &OpenPositionRequest,
    ) -> Result<DealReference, BrokerError> {
        debug!(
            "Opening {} {} x{} ({})",
            request.epic, request.direction, request.size, request.deal_reference
        );
        let resp = self.send(Method::POST, "/positions/otc", 2, &[], Some(request))?;
        parse(resp)
    }

    pub(super) fn amend_position(
        &self,
        deal_id: &str,
        request: &AmendPositionRequest,
    ) -> Result<DealReference, BrokerError> {
        let path = format!("/positions/otc/{deal_id}");
        let resp = self.send(Method::PUT, &path, 2, &[], Some(request))?;
        parse(resp)
    }

    pub(super) fn close_position(
        &self,
        request: &ClosePositionRequest,
    ) -> Result<DealReference, BrokerError> {
        let resp = self.send(Method::DELETE, "/positions/otc", 1, &[], Some(request))?;
        parse(resp)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        version: u8,
        query: &[(&str, String)],
    ) -> Result<T, BrokerError> {
        let resp = self.send::<()>(Method::GET, path, version, query, None)?;
        parse(resp)
    }

    /// Send an authenticated request. DELETE goes out as POST with `_method: DELETE`
    /// so that it can carry a body.
    fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        version: u8,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Response, BrokerError> {
        let session = self.session.as_ref().ok_or(BrokerError::NotAuthenticated)?;
        let url = format!("{}{path}", self.base_url);
        debug!("{method} {path} v{version}");

        let (wire_method, tunnelled) = if method == Method::DELETE {
            (Method::POST, true)
        } else {
            (method, false)
        };

        let mut req = self
            .client
            .request(wire_method, &url)
            .header("X-IG-API-KEY", self.credentials.api_key.as_str())
            .header("CST", session.cst.as_str())
            .header("X-SECURITY-TOKEN", session.security_token.as_str())
            .header("Version", version.to_string())
            .header("Accept", "application/json; charset=UTF-8");
        if tunnelled {
            req = req.header("_method", "DELETE");
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        req.send()
            .map_err(|e| BrokerError::Connection(format!("{path} request failed: {e}")))
    }
}

/// Fail on a non-success status, using the body's `errorCode`.
fn check(resp: Response) -> Result<Response, BrokerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(BrokerError::from_api(status.as_u16(), error_code(&body)))
}

fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, BrokerError> {
    check(resp)?
        .json::<T>()
        .map_err(|e| BrokerError::Parse(e.to_string()))
}
