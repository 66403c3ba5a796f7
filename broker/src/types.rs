//! Shared broker types: accounts, markets, positions, working orders, watchlists.
//!
//! Field names follow the IG REST wire format (camelCase). Numeric fields that
//! IG sends as `null` for closed or non-priced markets are `Option`.

use std::fmt;

use igkit::{Direction, Quote};
use serde::{Deserialize, Serialize};

// ============================================================================
// Accounts
// ============================================================================

/// Kind of IG account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Cfd,
    Spreadbet,
    Physical,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountType::Cfd => "CFD",
            AccountType::Spreadbet => "SPREADBET",
            AccountType::Physical => "PHYSICAL",
        };
        f.write_str(name)
    }
}

/// Balances of the active account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub balance: f64,
    pub deposit: f64,
    pub profit_loss: f64,
    pub available: f64,
}

/// Another account reachable from the same login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherAccount {
    pub account_id: String,
    pub account_name: String,
    #[serde(default)]
    pub preferred: bool,
    pub account_type: AccountType,
}

/// The logged-in account, as returned by `POST /session`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub client_id: String,
    #[serde(rename = "currentAccountId")]
    pub id: String,
    pub account_type: AccountType,
    pub account_info: AccountInfo,
    pub currency_iso_code: String,
    #[serde(default)]
    pub lightstreamer_endpoint: Option<String>,
    #[serde(rename = "accounts", default)]
    pub other_accounts: Vec<OtherAccount>,
}

impl Account {
    /// Multi-line human-readable report of the account.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Account:        {} ({})\n", self.id, self.account_type));
        out.push_str(&format!("Client:         {}\n", self.client_id));
        out.push_str(&format!("Currency:       {}\n", self.currency_iso_code));
        out.push_str(&format!("Balance:        {:.2}\n", self.account_info.balance));
        out.push_str(&format!("Deposit:        {:.2}\n", self.account_info.deposit));
        out.push_str(&format!("Profit/Loss:    {:.2}\n", self.account_info.profit_loss));
        out.push_str(&format!("Available:      {:.2}\n", self.account_info.available));
        if self.other_accounts.is_empty() {
            out.push_str("Other accounts: none\n");
        } else {
            out.push_str("Other accounts:\n");
            for other in &self.other_accounts {
                let marker = if other.preferred { " *" } else { "" };
                out.push_str(&format!(
                    "  {} {} ({}){}\n",
                    other.account_id, other.account_name, other.account_type, marker
                ));
            }
        }
        out
    }
}

// ============================================================================
// Markets
// ============================================================================

/// Trading status of a market.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Tradeable,
    Closed,
    EditsOnly,
    Offline,
    OnAuction,
    OnAuctionNoEdits,
    Suspended,
    #[serde(other)]
    Unknown,
}

/// Market summary as found in searches, positions, orders and watchlists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInstrument {
    pub epic: String,
    pub instrument_name: String,
    #[serde(default)]
    pub instrument_type: Option<String>,
    #[serde(default = "default_expiry")]
    pub expiry: String,
    pub market_status: MarketStatus,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub offer: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub net_change: Option<f64>,
    #[serde(default)]
    pub percentage_change: Option<f64>,
    #[serde(default)]
    pub scaling_factor: Option<f64>,
    #[serde(default)]
    pub delay_time: Option<f64>,
    #[serde(default)]
    pub streaming_prices_available: bool,
    #[serde(default)]
    pub update_time: Option<String>,
    #[serde(default, rename = "updateTimeUTC")]
    pub update_time_utc: Option<String>,
}

fn default_expiry() -> String {
    "-".to_string()
}

impl MarketInstrument {
    /// Current bid/offer, if the market is priced.
    pub fn quote(&self) -> Option<Quote> {
        Some(Quote::new(self.bid?, self.offer?))
    }

    pub fn is_closed(&self) -> bool {
        self.market_status == MarketStatus::Closed
    }

    /// Market summary of one epic, assembled from its details and live snapshot.
    pub fn from_parts(details: InstrumentDetails, snapshot: InstrumentSnapshot) -> Self {
        Self {
            epic: details.epic,
            instrument_name: details.name,
            instrument_type: Some(details.instrument_type).filter(|t| !t.is_empty()),
            expiry: details.expiry,
            market_status: snapshot.market_status,
            bid: snapshot.bid,
            offer: snapshot.offer,
            high: snapshot.high,
            low: snapshot.low,
            net_change: snapshot.net_change,
            percentage_change: snapshot.percentage_change,
            scaling_factor: snapshot.scaling_factor,
            delay_time: snapshot.delay_time,
            streaming_prices_available: details.streaming_prices_available,
            update_time: snapshot.update_time,
            update_time_utc: None,
        }
    }
}

/// Currency a market can be dealt in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub base_exchange_rate: Option<f64>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

/// Static instrument description: the `instrument` object of `GET /markets/{epic}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDetails {
    pub epic: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
    #[serde(default = "default_expiry")]
    pub expiry: String,
    #[serde(default)]
    pub market_id: Option<String>,
    #[serde(default)]
    pub chart_code: Option<String>,
    #[serde(default)]
    pub news_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub contract_size: Option<String>,
    #[serde(default)]
    pub lot_size: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub one_pip_means: Option<String>,
    #[serde(default)]
    pub value_of_one_pip: Option<String>,
    #[serde(default)]
    pub margin_factor: Option<f64>,
    #[serde(default)]
    pub margin_factor_unit: Option<String>,
    #[serde(default)]
    pub controlled_risk_allowed: bool,
    #[serde(default)]
    pub force_open_allowed: bool,
    #[serde(default)]
    pub stops_limits_allowed: bool,
    #[serde(default)]
    pub streaming_prices_available: bool,
    #[serde(default)]
    pub currencies: Vec<Currency>,
    #[serde(default)]
    pub special_info: Vec<String>,
}

/// Live pricing block: the `snapshot` object of `GET /markets/{epic}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSnapshot {
    pub market_status: MarketStatus,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub offer: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub net_change: Option<f64>,
    #[serde(default)]
    pub percentage_change: Option<f64>,
    #[serde(default)]
    pub binary_odds: Option<f64>,
    #[serde(default)]
    pub controlled_risk_extra_spread: Option<f64>,
    #[serde(default)]
    pub decimal_places_factor: Option<f64>,
    #[serde(default)]
    pub scaling_factor: Option<f64>,
    #[serde(default)]
    pub delay_time: Option<f64>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl InstrumentSnapshot {
    pub fn quote(&self) -> Option<Quote> {
        Some(Quote::new(self.bid?, self.offer?))
    }
}

// ============================================================================
// Dealing
// ============================================================================

/// An open OTC position together with the market it is on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub deal_id: String,
    pub deal_reference: String,
    pub direction: Direction,
    pub size: f64,
    /// Opening level.
    pub level: f64,
    #[serde(default)]
    pub limit_level: Option<f64>,
    #[serde(default)]
    pub stop_level: Option<f64>,
    #[serde(default)]
    pub trailing_step: Option<f64>,
    #[serde(default)]
    pub trailing_stop_distance: Option<f64>,
    #[serde(default)]
    pub contract_size: Option<f64>,
    #[serde(default)]
    pub controlled_risk: bool,
    pub currency: String,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default, rename = "createdDateUTC")]
    pub created_date_utc: Option<String>,
    pub market: MarketInstrument,
}

impl Position {
    pub fn epic(&self) -> &str {
        &self.market.epic
    }

    pub fn is_trailing(&self) -> bool {
        self.trailing_stop_distance.is_some()
    }
}

/// A resting order waiting for its level to be reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrder {
    pub deal_id: String,
    pub direction: Direction,
    pub epic: String,
    pub order_size: f64,
    pub order_level: f64,
    pub order_type: String,
    pub time_in_force: String,
    #[serde(default)]
    pub good_till_date: Option<String>,
    #[serde(default, rename = "goodTillDateISO")]
    pub good_till_date_iso: Option<String>,
    #[serde(default, rename = "createdDateUTC")]
    pub created_date_utc: Option<String>,
    #[serde(default)]
    pub guaranteed_stop: bool,
    #[serde(default)]
    pub stop_distance: Option<f64>,
    #[serde(default)]
    pub limit_distance: Option<f64>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub dma: bool,
    pub market: MarketInstrument,
}

/// Reference returned by every dealing request; confirms asynchronously.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealReference {
    pub deal_reference: String,
}

impl fmt::Display for DealReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.deal_reference)
    }
}

// ============================================================================
// Watchlists
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub editable: bool,
    /// IG spells this one `deleteable`.
    #[serde(default, rename = "deleteable")]
    pub deletable: bool,
    #[serde(default)]
    pub default_system_watchlist: bool,
}
