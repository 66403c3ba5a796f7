//! Request payloads for the dealing endpoints.

use std::fmt;
use std::str::FromStr;

use igkit::{Direction, OrderIntent};
use serde::{Deserialize, Serialize};

use crate::types::MarketInstrument;

/// Fill strategy of a market order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Fill entirely or not at all.
    #[default]
    FillOrKill,
    /// Fill what is available, drop the rest.
    ExecuteAndEliminate,
}

impl TimeInForce {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInForce::FillOrKill => "FILL_OR_KILL",
            TimeInForce::ExecuteAndEliminate => "EXECUTE_AND_ELIMINATE",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FILL_OR_KILL" => Ok(TimeInForce::FillOrKill),
            "EXECUTE_AND_ELIMINATE" => Ok(TimeInForce::ExecuteAndEliminate),
            _ => Err(format!("unknown time in force: {s}")),
        }
    }
}

/// Account-level defaults applied to every new position.
#[derive(Clone, Debug, PartialEq)]
pub struct DealOptions {
    pub currency_code: String,
    pub time_in_force: TimeInForce,
    pub guaranteed_stop: bool,
}

impl Default for DealOptions {
    fn default() -> Self {
        Self {
            currency_code: "GBP".to_string(),
            time_in_force: TimeInForce::FillOrKill,
            guaranteed_stop: false,
        }
    }
}

/// `POST /positions/otc`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPositionRequest {
    pub deal_reference: String,
    pub epic: String,
    pub expiry: String,
    pub direction: Direction,
    pub size: f64,
    pub order_type: String,
    pub time_in_force: TimeInForce,
    pub guaranteed_stop: bool,
    pub force_open: bool,
    pub currency_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<f64>,
    #[serde(default)]
    pub trailing_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_increment: Option<f64>,
}

impl OpenPositionRequest {
    /// Market order opening a new position from an already-validated intent.
    ///
    /// A stop increment on the intent makes this a trailing-stop order.
    pub fn market(
        deal_reference: &str,
        instrument: &MarketInstrument,
        intent: &OrderIntent,
        options: &DealOptions,
    ) -> Self {
        let trailing = intent.stop_increment.is_some();
        Self {
            deal_reference: deal_reference.to_string(),
            epic: instrument.epic.clone(),
            expiry: instrument.expiry.clone(),
            direction: intent.direction,
            size: intent.size,
            order_type: "MARKET".to_string(),
            time_in_force: options.time_in_force,
            // IG refuses guaranteed stops on trailing orders.
            guaranteed_stop: options.guaranteed_stop && !trailing,
            force_open: true,
            currency_code: options.currency_code.clone(),
            limit_distance: intent.limit_distance(),
            limit_level: intent.limit_level(),
            stop_distance: intent.stop_distance(),
            stop_level: intent.stop_level(),
            trailing_stop: trailing,
            trailing_stop_increment: intent.stop_increment,
        }
    }
}

/// `PUT /positions/otc/{dealId}`. Absent levels are sent as `null`, which removes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendPositionRequest {
    pub limit_level: Option<f64>,
    pub stop_level: Option<f64>,
    pub trailing_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_increment: Option<f64>,
}

/// `DELETE /positions/otc` (sent as POST with `_method: DELETE`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionRequest {
    pub deal_id: String,
    pub direction: Direction,
    pub size: f64,
    pub order_type: String,
    pub time_in_force: TimeInForce,
}

/// `POST /watchlists`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWatchlistRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub epics: Vec<String>,
}
