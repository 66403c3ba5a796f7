//! Broker trait and the IG REST implementation for igkit.
//!
//! Provides a `Broker` trait over the IG dealing surface, a [`Dealer`] that
//! validates every order against the market's dealing rules before it is sent,
//! and implementations:
//!
//! - **IG** (feature `ig`, default): IG REST trading API over blocking HTTP
//! - **Mock** ([`mock::MockBroker`]): in-memory, records requests for tests

pub mod dealer;
pub mod error;
pub mod history;
pub mod mock;
pub mod requests;
pub mod types;

#[cfg(feature = "ig")]
pub mod ig;

pub use dealer::{CheckedOrder, Dealer};
pub use error::BrokerError;
pub use history::*;
pub use requests::*;
pub use types::*;

use igkit::DealingRules;

/// A broker connection that can look up markets, list positions and deal.
///
/// Implementations are blocking. Dealing calls take `&self`; callers serialize them.
pub trait Broker {
    /// First market matching a search term.
    fn market_by_search(&self, term: &str) -> Result<MarketInstrument, BrokerError>;

    /// Current dealing rules of a market.
    fn dealing_rules(&self, epic: &str) -> Result<DealingRules, BrokerError>;

    /// Market summary of exactly this epic.
    fn market(&self, epic: &str) -> Result<MarketInstrument, BrokerError> {
        let details = self.market_details(epic)?;
        let snapshot = self.market_snapshot(epic)?;
        Ok(MarketInstrument::from_parts(details, snapshot))
    }

    /// Static instrument description.
    fn market_details(&self, epic: &str) -> Result<InstrumentDetails, BrokerError>;

    /// Live pricing snapshot.
    fn market_snapshot(&self, epic: &str) -> Result<InstrumentSnapshot, BrokerError>;

    /// All open positions of the active account.
    fn open_positions(&self) -> Result<Vec<Position>, BrokerError>;

    /// All working orders of the active account.
    fn working_orders(&self) -> Result<Vec<WorkingOrder>, BrokerError>;

    /// Open a position. The request is sent as-is; see [`Dealer`] for the validated path.
    fn create_position(&self, request: &OpenPositionRequest) -> Result<DealReference, BrokerError>;

    /// Change the stop/limit of an open position.
    fn amend_position(
        &self,
        deal_id: &str,
        request: &AmendPositionRequest,
    ) -> Result<DealReference, BrokerError>;

    /// Close all or part of a position.
    fn close_position(&self, request: &ClosePositionRequest) -> Result<DealReference, BrokerError>;
}

impl<B: Broker + ?Sized> Broker for &B {
    fn market_by_search(&self, term: &str) -> Result<MarketInstrument, BrokerError> {
        (**self).market_by_search(term)
    }

    fn dealing_rules(&self, epic: &str) -> Result<DealingRules, BrokerError> {
        (**self).dealing_rules(epic)
    }

    fn market(&self, epic: &str) -> Result<MarketInstrument, BrokerError> {
        (**self).market(epic)
    }

    fn market_details(&self, epic: &str) -> Result<InstrumentDetails, BrokerError> {
        (**self).market_details(epic)
    }

    fn market_snapshot(&self, epic: &str) -> Result<InstrumentSnapshot, BrokerError> {
        (**self).market_snapshot(epic)
    }

    fn open_positions(&self) -> Result<Vec<Position>, BrokerError> {
        (**self).open_positions()
    }

    fn working_orders(&self) -> Result<Vec<WorkingOrder>, BrokerError> {
        (**self).working_orders()
    }

    fn create_position(&self, request: &OpenPositionRequest) -> Result<DealReference, BrokerError> {
        (**self).create_position(request)
    }

    fn amend_position(
        &self,
        deal_id: &str,
        request: &AmendPositionRequest,
    ) -> Result<DealReference, BrokerError> {
        (**self).amend_position(deal_id, request)
    }

    fn close_position(&self, request: &ClosePositionRequest) -> Result<DealReference, BrokerError> {
        (**self).close_position(request)
    }
}
