//! Account history and historical prices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One entry of the account activity log (`GET /history/activity`, v3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub date: String,
    #[serde(default)]
    pub epic: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Present only when requested with `detailed=true`.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Filter for an activity request. `from` is required by the API.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityQuery {
    pub from: String,
    pub to: Option<String>,
    pub detailed: bool,
    pub deal_id: Option<String>,
    /// FIQL expression, e.g. `channel==SYSTEM;type==POSITION`.
    pub filter: Option<String>,
}

impl ActivityQuery {
    pub fn since(from: &str) -> Self {
        Self {
            from: from.to_string(),
            ..Self::default()
        }
    }

    pub fn to(mut self, to: &str) -> Self {
        self.to = Some(to.to_string());
        self
    }

    pub fn detailed(mut self) -> Self {
        self.detailed = true;
        self
    }

    pub fn deal_id(mut self, deal_id: &str) -> Self {
        self.deal_id = Some(deal_id.to_string());
        self
    }

    pub fn filter(mut self, fiql: &str) -> Self {
        self.filter = Some(fiql.to_string());
        self
    }

    /// Query-string pairs in the order the API documents them.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("from", self.from.clone())];
        if let Some(to) = &self.to {
            query.push(("to", to.clone()));
        }
        query.push(("detailed", self.detailed.to_string()));
        if let Some(deal_id) = &self.deal_id {
            query.push(("dealId", deal_id.clone()));
        }
        if let Some(filter) = &self.filter {
            query.push(("filter", filter.clone()));
        }
        query
    }
}

/// A cash or trade transaction (`GET /history/transactions`).
///
/// IG sends the amounts as display strings (e.g. `"£-12.30"`), kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: String,
    #[serde(default)]
    pub date_utc: Option<String>,
    #[serde(default)]
    pub open_date_utc: Option<String>,
    pub instrument_name: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub profit_and_loss: Option<String>,
    pub transaction_type: String,
    pub reference: String,
    #[serde(default)]
    pub open_level: Option<String>,
    #[serde(default)]
    pub close_level: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub cash_transaction: bool,
}

/// Remaining historical-price data points for the API key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAllowance {
    pub remaining_allowance: u64,
    pub total_allowance: u64,
    /// Seconds until the allowance resets.
    pub allowance_expiry: u64,
}

/// Bid/ask/last at one point of a candle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub last_traded: Option<f64>,
}

impl PricePoint {
    /// Midpoint of bid and ask, when both are present.
    pub fn mid(&self) -> Option<f64> {
        Some((self.bid? + self.ask?) / 2.0)
    }
}

/// One OHLC candle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCandle {
    pub snapshot_time: String,
    #[serde(default, rename = "snapshotTimeUTC")]
    pub snapshot_time_utc: Option<String>,
    pub open_price: PricePoint,
    pub close_price: PricePoint,
    pub high_price: PricePoint,
    pub low_price: PricePoint,
    #[serde(default)]
    pub last_traded_volume: Option<f64>,
}

/// Candle width for historical prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceResolution {
    Second,
    Minute,
    #[serde(rename = "MINUTE_2")]
    Minute2,
    #[serde(rename = "MINUTE_3")]
    Minute3,
    #[serde(rename = "MINUTE_5")]
    Minute5,
    #[serde(rename = "MINUTE_10")]
    Minute10,
    #[serde(rename = "MINUTE_15")]
    Minute15,
    #[serde(rename = "MINUTE_30")]
    Minute30,
    Hour,
    #[serde(rename = "HOUR_2")]
    Hour2,
    #[serde(rename = "HOUR_3")]
    Hour3,
    #[serde(rename = "HOUR_4")]
    Hour4,
    Day,
    Week,
    Month,
}

impl PriceResolution {
    pub const ALL: [PriceResolution; 15] = [
        PriceResolution::Second,
        PriceResolution::Minute,
        PriceResolution::Minute2,
        PriceResolution::Minute3,
        PriceResolution::Minute5,
        PriceResolution::Minute10,
        PriceResolution::Minute15,
        PriceResolution::Minute30,
        PriceResolution::Hour,
        PriceResolution::Hour2,
        PriceResolution::Hour3,
        PriceResolution::Hour4,
        PriceResolution::Day,
        PriceResolution::Week,
        PriceResolution::Month,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PriceResolution::Second => "SECOND",
            PriceResolution::Minute => "MINUTE",
            PriceResolution::Minute2 => "MINUTE_2",
            PriceResolution::Minute3 => "MINUTE_3",
            PriceResolution::Minute5 => "MINUTE_5",
            PriceResolution::Minute10 => "MINUTE_10",
            PriceResolution::Minute15 => "MINUTE_15",
            PriceResolution::Minute30 => "MINUTE_30",
            PriceResolution::Hour => "HOUR",
            PriceResolution::Hour2 => "HOUR_2",
            PriceResolution::Hour3 => "HOUR_3",
            PriceResolution::Hour4 => "HOUR_4",
            PriceResolution::Day => "DAY",
            PriceResolution::Week => "WEEK",
            PriceResolution::Month => "MONTH",
        }
    }
}

impl fmt::Display for PriceResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        PriceResolution::ALL
            .into_iter()
            .find(|r| r.as_str() == upper)
            .ok_or_else(|| format!("unknown price resolution: {s}"))
    }
}
