//! IG-specific response envelopes and request bodies.
//!
//! IG wraps most payloads in an object keyed by the collection name and nests
//! position data one level down; these types mirror that shape and convert to
//! the flat types in [`crate::types`].

use igkit::{Direction, RawDealingRules};
use serde::{Deserialize, Serialize};

use crate::history::{Activity, PriceAllowance, PriceCandle, Transaction};
use crate::types::{
    Account, InstrumentDetails, InstrumentSnapshot, MarketInstrument, Position, Watchlist,
    WorkingOrder,
};

/// Error body of a failed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: String,
}

/// The `errorCode` of an error body, or the raw body if it has none.
pub fn error_code(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.error_code,
        Err(_) if body.trim().is_empty() => "no error body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Serialize)]
pub struct SessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// `POST /session` v2 body; the tokens come back as headers.
pub type SessionResponse = Account;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchAccountRequest<'a> {
    pub account_id: &'a str,
    pub default_account: bool,
}

// ============================================================================
// Markets
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<MarketInstrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealingRulesEnvelope {
    pub dealing_rules: RawDealingRules,
}

#[derive(Debug, Deserialize)]
pub struct InstrumentEnvelope {
    pub instrument: InstrumentDetails,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotEnvelope {
    pub snapshot: InstrumentSnapshot,
}

/// `GET /markets/{epic}` read for both the instrument and its snapshot.
#[derive(Debug, Deserialize)]
pub struct MarketEnvelope {
    pub instrument: InstrumentDetails,
    pub snapshot: InstrumentSnapshot,
}

// ============================================================================
// Positions and orders
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PositionsResponse {
    pub positions: Vec<PositionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PositionEntry {
    pub position: PositionData,
    pub market: MarketInstrument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    pub deal_id: String,
    pub deal_reference: String,
    pub direction: Direction,
    pub size: f64,
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
}

impl From<PositionEntry> for Position {
    fn from(entry: PositionEntry) -> Self {
        let p = entry.position;
        Position {
            deal_id: p.deal_id,
            deal_reference: p.deal_reference,
            direction: p.direction,
            size: p.size,
            level: p.level,
            limit_level: p.limit_level,
            stop_level: p.stop_level,
            trailing_step: p.trailing_step,
            trailing_stop_distance: p.trailing_stop_distance,
            contract_size: p.contract_size,
            controlled_risk: p.controlled_risk,
            currency: p.currency,
            created_date: p.created_date,
            created_date_utc: p.created_date_utc,
            market: entry.market,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrdersResponse {
    pub working_orders: Vec<WorkingOrderEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrderEntry {
    pub working_order_data: WorkingOrderData,
    pub market_data: MarketInstrument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrderData {
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
}

impl From<WorkingOrderEntry> for WorkingOrder {
    fn from(entry: WorkingOrderEntry) -> Self {
        let o = entry.working_order_data;
        WorkingOrder {
            deal_id: o.deal_id,
            direction: o.direction,
            epic: o.epic,
            order_size: o.order_size,
            order_level: o.order_level,
            order_type: o.order_type,
            time_in_force: o.time_in_force,
            good_till_date: o.good_till_date,
            good_till_date_iso: o.good_till_date_iso,
            created_date_utc: o.created_date_utc,
            guaranteed_stop: o.guaranteed_stop,
            stop_distance: o.stop_distance,
            limit_distance: o.limit_distance,
            currency_code: o.currency_code,
            dma: o.dma,
            market: entry.market_data,
        }
    }
}

// ============================================================================
// History and prices
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ActivityResponse {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct PricesResponse {
    #[serde(default)]
    pub prices: Vec<PriceCandle>,
    #[serde(default)]
    pub metadata: Option<PriceMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct PriceMetadata {
    pub allowance: PriceAllowance,
}

// ============================================================================
// Watchlists
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WatchlistsResponse {
    pub watchlists: Vec<Watchlist>,
}

#[derive(Debug, Deserialize)]
pub struct WatchlistMarketsResponse {
    pub markets: Vec<MarketInstrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWatchlistResponse {
    pub watchlist_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct WatchlistMarketRequest<'a> {
    pub epic: &'a str,
}

/// `{"status": "SUCCESS"}` style acknowledgement.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_extraction() {
        assert_eq!(
            error_code(r#"{"errorCode":"error.security.invalid-details"}"#),
            "error.security.invalid-details"
        );
        assert_eq!(error_code("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_code(""), "no error body");
    }

    #[test]
    fn status_success() {
        let ok: StatusResponse = serde_json::from_str(r#"{"status":"SUCCESS"}"#).unwrap();
        assert!(ok.is_success());
        let fail: StatusResponse = serde_json::from_str(r#"{"status":"FAILURE"}"#).unwrap();
        assert!(!fail.is_success());
    }
}
