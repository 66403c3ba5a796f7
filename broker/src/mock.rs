//! Mock broker for testing: implements the `Broker` trait with configurable behavior.
//!
//! Use this in integration tests to simulate IG responses without network calls.
//!
//! ```ignore
//! use igkit_broker::mock::MockBroker;
//!
//! let broker = MockBroker::builder()
//!     .with_market(ftse)
//!     .with_rules("IX.D.FTSE.DAILY.IP", rules)
//!     .with_position(position)
//!     .build();
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use igkit::DealingRules;
use rustc_hash::FxHashMap;

use crate::Broker;
use crate::error::BrokerError;
use crate::requests::{AmendPositionRequest, ClosePositionRequest, OpenPositionRequest};
use crate::types::*;

/// How the mock broker answers dealing requests.
#[derive(Clone, Debug, Default)]
pub enum DealMode {
    /// Every request is accepted.
    #[default]
    Accept,
    /// Every request fails with this IG error code.
    Reject(String),
}

/// A recorded dealing request, for assertion in tests.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedRequest {
    Open(OpenPositionRequest),
    Amend {
        deal_id: String,
        request: AmendPositionRequest,
    },
    Close(ClosePositionRequest),
}

/// Builder for `MockBroker`.
#[derive(Default)]
pub struct MockBrokerBuilder {
    deal_mode: DealMode,
    markets: Vec<MarketInstrument>,
    rules: FxHashMap<String, DealingRules>,
    positions: Vec<Position>,
    working_orders: Vec<WorkingOrder>,
}

impl MockBrokerBuilder {
    pub fn deal_mode(mut self, mode: DealMode) -> Self {
        self.deal_mode = mode;
        self
    }

    pub fn with_market(mut self, market: MarketInstrument) -> Self {
        self.markets.push(market);
        self
    }

    pub fn with_rules(mut self, epic: &str, rules: DealingRules) -> Self {
        self.rules.insert(epic.to_string(), rules);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    pub fn with_working_order(mut self, order: WorkingOrder) -> Self {
        self.working_orders.push(order);
        self
    }

    pub fn build(self) -> MockBroker {
        MockBroker {
            deal_mode: self.deal_mode,
            markets: self.markets,
            rules: self.rules,
            positions: self.positions,
            working_orders: self.working_orders,
            rules_requests: AtomicUsize::new(0),
            next_reference: AtomicUsize::new(1),
            requests: Mutex::new(Vec::new()),
        }
    }
}

/// A mock broker that records dealing requests and serves canned market data.
pub struct MockBroker {
    deal_mode: DealMode,
    markets: Vec<MarketInstrument>,
    rules: FxHashMap<String, DealingRules>,
    positions: Vec<Position>,
    working_orders: Vec<WorkingOrder>,
    rules_requests: AtomicUsize,
    next_reference: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockBroker {
    pub fn builder() -> MockBrokerBuilder {
        MockBrokerBuilder::default()
    }

    /// Dealing requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// How many times dealing rules were fetched.
    pub fn rules_requests(&self) -> usize {
        self.rules_requests.load(Ordering::Relaxed)
    }

    fn find_market(&self, epic: &str) -> Result<&MarketInstrument, BrokerError> {
        self.markets
            .iter()
            .find(|m| m.epic == epic)
            .ok_or_else(|| BrokerError::NotFound(format!("market {epic}")))
    }

    fn deal(&self, request: RecordedRequest, reference: Option<&str>) -> Result<DealReference, BrokerError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        match &self.deal_mode {
            DealMode::Reject(code) => Err(BrokerError::from_api(400, code.clone())),
            DealMode::Accept => {
                let deal_reference = match reference {
                    Some(r) => r.to_string(),
                    None => format!(
                        "MOCK{}",
                        self.next_reference.fetch_add(1, Ordering::Relaxed)
                    ),
                };
                Ok(DealReference { deal_reference })
            }
        }
    }
}

impl Broker for MockBroker {
    fn market_by_search(&self, term: &str) -> Result<MarketInstrument, BrokerError> {
        let needle = term.to_lowercase();
        self.markets
            .iter()
            .find(|m| {
                m.epic.to_lowercase().contains(&needle)
                    || m.instrument_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .ok_or_else(|| BrokerError::NotFound(format!("no market matches \"{term}\"")))
    }

    fn dealing_rules(&self, epic: &str) -> Result<DealingRules, BrokerError> {
        self.rules_requests.fetch_add(1, Ordering::Relaxed);
        self.rules
            .get(epic)
            .cloned()
            .ok_or_else(|| BrokerError::NotFound(format!("dealing rules for {epic}")))
    }

    fn market_details(&self, epic: &str) -> Result<InstrumentDetails, BrokerError> {
        let market = self.find_market(epic)?;
        Ok(InstrumentDetails {
            epic: market.epic.clone(),
            name: market.instrument_name.clone(),
            instrument_type: market.instrument_type.clone().unwrap_or_default(),
            expiry: market.expiry.clone(),
            market_id: None,
            chart_code: None,
            news_code: None,
            country: None,
            contract_size: None,
            lot_size: None,
            unit: None,
            one_pip_means: None,
            value_of_one_pip: None,
            margin_factor: None,
            margin_factor_unit: None,
            controlled_risk_allowed: false,
            force_open_allowed: true,
            stops_limits_allowed: true,
            streaming_prices_available: market.streaming_prices_available,
            currencies: Vec::new(),
            special_info: Vec::new(),
        })
    }

    fn market_snapshot(&self, epic: &str) -> Result<InstrumentSnapshot, BrokerError> {
        let market = self.find_market(epic)?;
        Ok(InstrumentSnapshot {
            market_status: market.market_status,
            bid: market.bid,
            offer: market.offer,
            high: market.high,
            low: market.low,
            net_change: market.net_change,
            percentage_change: market.percentage_change,
            binary_odds: None,
            controlled_risk_extra_spread: None,
            decimal_places_factor: None,
            scaling_factor: market.scaling_factor,
            delay_time: market.delay_time,
            update_time: market.update_time.clone(),
        })
    }

    fn open_positions(&self) -> Result<Vec<Position>, BrokerError> {
        Ok(self.positions.clone())
    }

    fn working_orders(&self) -> Result<Vec<WorkingOrder>, BrokerError> {
        Ok(self.working_orders.clone())
    }

    fn create_position(&self, request: &OpenPositionRequest) -> Result<DealReference, BrokerError> {
        self.deal(
            RecordedRequest::Open(request.clone()),
            Some(&request.deal_reference),
        )
    }

    fn amend_position(
        &self,
        deal_id: &str,
        request: &AmendPositionRequest,
    ) -> Result<DealReference, BrokerError> {
        if !self.positions.iter().any(|p| p.deal_id == deal_id) {
            return Err(BrokerError::from_api(404, "error.position.notfound".into()));
        }
        self.deal(
            RecordedRequest::Amend {
                deal_id: deal_id.to_string(),
                request: request.clone(),
            },
            None,
        )
    }

    fn close_position(&self, request: &ClosePositionRequest) -> Result<DealReference, BrokerError> {
        self.deal(RecordedRequest::Close(request.clone()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use igkit::Direction;

    fn ftse() -> MarketInstrument {
        serde_json::from_value(serde_json::json!({
            "epic": "IX.D.FTSE.DAILY.IP",
            "instrumentName": "FTSE 100",
            "expiry": "DFB",
            "marketStatus": "TRADEABLE",
            "bid": 7500.0,
            "offer": 7501.0
        }))
        .unwrap()
    }

    fn close_request() -> ClosePositionRequest {
        ClosePositionRequest {
            deal_id: "DIAAAA".into(),
            direction: Direction::Sell,
            size: 1.0,
            order_type: "MARKET".into(),
            time_in_force: Default::default(),
        }
    }

    #[test]
    fn search_matches_name_or_epic() {
        let broker = MockBroker::builder().with_market(ftse()).build();
        assert_eq!(broker.market_by_search("ftse").unwrap().epic, "IX.D.FTSE.DAILY.IP");
        assert!(matches!(
            broker.market_by_search("DAX"),
            Err(BrokerError::NotFound(_))
        ));
    }

    #[test]
    fn snapshot_mirrors_market() {
        let broker = MockBroker::builder().with_market(ftse()).build();
        let snapshot = broker.market_snapshot("IX.D.FTSE.DAILY.IP").unwrap();
        assert_eq!(snapshot.bid, Some(7500.0));
        assert_eq!(snapshot.market_status, MarketStatus::Tradeable);
    }

    #[test]
    fn rules_fetches_are_counted() {
        let broker = MockBroker::builder().build();
        assert!(broker.dealing_rules("IX.D.FTSE.DAILY.IP").is_err());
        assert_eq!(broker.rules_requests(), 1);
    }

    #[test]
    fn records_requests() {
        let broker = MockBroker::builder().build();
        let reference = broker.close_position(&close_request()).unwrap();
        assert_eq!(reference.deal_reference, "MOCK1");
        assert_eq!(
            broker.requests(),
            vec![RecordedRequest::Close(close_request())]
        );
    }

    #[test]
    fn reject_mode() {
        let broker = MockBroker::builder()
            .deal_mode(DealMode::Reject("error.service.marketdata.position.notional.details.null".into()))
            .build();
        let err = broker.close_position(&close_request()).unwrap_err();
        assert!(matches!(err, BrokerError::Api { status: 400, .. }));
        assert_eq!(broker.requests().len(), 1);
    }
}
