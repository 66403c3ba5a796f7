//! IG trading REST API.
//!
//! Blocking (sync) via `reqwest::blocking`. Log in with
//! [`IgClient::authenticate`] before any other call; requests made without a
//! session fail with [`BrokerError::NotAuthenticated`].

pub mod client;
pub mod session;
pub mod types;

use igkit::DealingRules;

pub use client::IgClient;
pub use session::{Credentials, Environment, Session};

use crate::Broker;
use crate::error::BrokerError;
use crate::requests::{AmendPositionRequest, ClosePositionRequest, OpenPositionRequest};
use crate::types::*;

impl Broker for IgClient {
    fn market_by_search(&self, term: &str) -> Result<MarketInstrument, BrokerError> {
        IgClient::market_by_search(self, term)
    }

    fn dealing_rules(&self, epic: &str) -> Result<DealingRules, BrokerError> {
        IgClient::dealing_rules(self, epic)
    }

    fn market(&self, epic: &str) -> Result<MarketInstrument, BrokerError> {
        IgClient::market(self, epic)
    }

    fn market_details(&self, epic: &str) -> Result<InstrumentDetails, BrokerError> {
        IgClient::market_details(self, epic)
    }

    fn market_snapshot(&self, epic: &str) -> Result<InstrumentSnapshot, BrokerError> {
        IgClient::market_snapshot(self, epic)
    }

    fn open_positions(&self) -> Result<Vec<Position>, BrokerError> {
        IgClient::open_positions(self)
    }

    fn working_orders(&self) -> Result<Vec<WorkingOrder>, BrokerError> {
        IgClient::working_orders(self)
    }

    fn create_position(&self, request: &OpenPositionRequest) -> Result<DealReference, BrokerError> {
        IgClient::create_position(self, request)
    }

    fn amend_position(
        &self,
        deal_id: &str,
        request: &AmendPositionRequest,
    ) -> Result<DealReference, BrokerError> {
        IgClient::amend_position(self, deal_id, request)
    }

    fn close_position(&self, request: &ClosePositionRequest) -> Result<DealReference, BrokerError> {
        IgClient::close_position(self, request)
    }
}
