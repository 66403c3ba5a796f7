//! Validated dealing: fetch rules, check the order, then submit.
//!
//! Every order-affecting call goes through [`OrderValidator`] against rules
//! fetched from the broker at call time. Checks that need no rules (closed
//! market, conflicting or missing legs, a trailing stop given as a level) run
//! first so a bad order never costs a request.

use igkit::{
    Direction, LimitLeg, OrderIntent, OrderParams, OrderValidator, Quote, StopLeg,
    TrailingAmendment, ValidationError,
};
use log::{info, warn};

use crate::error::BrokerError;
use crate::requests::{
    AmendPositionRequest, ClosePositionRequest, DealOptions, OpenPositionRequest, TimeInForce,
};
use crate::types::{DealReference, MarketInstrument, Position};
use crate::Broker;

/// A new order that passed local validation against one market's rules.
///
/// Only [`Dealer`] creates these, so holding one means the checks ran.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckedOrder {
    market: MarketInstrument,
    intent: OrderIntent,
}

impl CheckedOrder {
    pub fn market(&self) -> &MarketInstrument {
        &self.market
    }

    pub fn intent(&self) -> &OrderIntent {
        &self.intent
    }
}

/// Order entry on top of a [`Broker`], with local validation.
pub struct Dealer<B> {
    broker: B,
}

impl<B: Broker> Dealer<B> {
    pub fn new(broker: B) -> Self {
        Self { broker }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn into_inner(self) -> B {
        self.broker
    }

    /// Check a new market order without sending it.
    ///
    /// A trailing stop (stop increment set) must be given as a distance; that
    /// and the leg checks run before the dealing rules are fetched.
    pub fn check_market_order(
        &self,
        instrument: &MarketInstrument,
        params: &OrderParams,
    ) -> Result<CheckedOrder, BrokerError> {
        ensure_open(instrument)?;
        let intent = params.to_intent()?;
        if intent.stop_increment.is_some() && matches!(intent.stop, Some(StopLeg::Level(_))) {
            warn!("Rejected order on {}: trailing stop given as a level", instrument.epic);
            return Err(BrokerError::TrailingStopLevel {
                epic: instrument.epic.clone(),
            });
        }
        intent.require_legs()?;
        self.check_new(instrument, &intent)?;
        Ok(CheckedOrder {
            market: instrument.clone(),
            intent,
        })
    }

    /// Open a market position with a stop and a limit.
    pub fn open_market_order(
        &self,
        deal_reference: &str,
        instrument: &MarketInstrument,
        params: &OrderParams,
        options: &DealOptions,
    ) -> Result<DealReference, BrokerError> {
        let checked = self.check_market_order(instrument, params)?;
        self.submit_checked(deal_reference, &checked, options)
    }

    /// Open a market position with a trailing stop.
    #[allow(clippy::too_many_arguments)]
    pub fn open_trailing_market_order(
        &self,
        deal_reference: &str,
        instrument: &MarketInstrument,
        direction: Direction,
        size: f64,
        stop_distance: f64,
        stop_increment: f64,
        limit: LimitLeg,
        options: &DealOptions,
    ) -> Result<DealReference, BrokerError> {
        ensure_open(instrument)?;
        let intent = OrderIntent::new(direction, size)
            .with_stop(StopLeg::Distance(stop_distance))
            .with_limit(limit)
            .with_stop_increment(stop_increment);
        self.check_new(instrument, &intent)?;

        let checked = CheckedOrder {
            market: instrument.clone(),
            intent,
        };
        self.submit_checked(deal_reference, &checked, options)
    }

    /// Send an order that already passed [`check_market_order`](Self::check_market_order).
    /// No rules are fetched again.
    pub fn submit_checked(
        &self,
        deal_reference: &str,
        checked: &CheckedOrder,
        options: &DealOptions,
    ) -> Result<DealReference, BrokerError> {
        let CheckedOrder { market, intent } = checked;
        let request = OpenPositionRequest::market(deal_reference, market, intent, options);
        let reference = self.broker.create_position(&request)?;
        let kind = if intent.stop_increment.is_some() { "trailing " } else { "" };
        info!(
            "Opened {kind}{} {} x{} on {}",
            reference, intent.direction, intent.size, market.epic
        );
        Ok(reference)
    }

    /// Move the limit and/or stop level of a position. Omitted levels keep
    /// their current value and are not re-validated.
    pub fn update_position(
        &self,
        position: &Position,
        limit_level: Option<f64>,
        stop_level: Option<f64>,
    ) -> Result<DealReference, BrokerError> {
        ensure_open(&position.market)?;
        let mut intent = OrderIntent::new(position.direction, position.size);
        intent.limit = limit_level.map(LimitLeg::Level);
        intent.stop = stop_level.map(StopLeg::Level);

        let quote = quote_of(&position.market)?;
        let rules = self.broker.dealing_rules(position.epic())?;
        OrderValidator::new(&rules)
            .check_update(&intent, quote)
            .inspect_err(|e| reject(position.epic(), e))?;

        let request = AmendPositionRequest {
            limit_level: limit_level.or(position.limit_level),
            stop_level: stop_level.or(position.stop_level),
            trailing_stop: false,
            trailing_stop_distance: None,
            trailing_stop_increment: None,
        };
        self.broker.amend_position(&position.deal_id, &request)
    }

    /// Amend a trailing-stop position. Omitted values keep the position's current ones.
    pub fn update_trailing_position(
        &self,
        position: &Position,
        stop_level: Option<f64>,
        trail_distance: Option<f64>,
        trail_increment: Option<f64>,
    ) -> Result<DealReference, BrokerError> {
        ensure_open(&position.market)?;
        let amendment = TrailingAmendment {
            direction: position.direction,
            size: position.size,
            stop_level,
            trailing_distance: trail_distance,
            trailing_increment: trail_increment,
        };

        let quote = quote_of(&position.market)?;
        let rules = self.broker.dealing_rules(position.epic())?;
        OrderValidator::new(&rules)
            .check_trailing_amendment(&amendment, quote)
            .inspect_err(|e| reject(position.epic(), e))?;

        let request = AmendPositionRequest {
            limit_level: position.limit_level,
            stop_level: stop_level.or(position.stop_level),
            trailing_stop: true,
            trailing_stop_distance: trail_distance.or(position.trailing_stop_distance),
            trailing_stop_increment: trail_increment.or(position.trailing_step),
        };
        self.broker.amend_position(&position.deal_id, &request)
    }

    /// Close a position, fully when `size` is `None`.
    pub fn close_position(
        &self,
        position: &Position,
        size: Option<f64>,
        time_in_force: TimeInForce,
    ) -> Result<DealReference, BrokerError> {
        ensure_open(&position.market)?;
        let size = size.unwrap_or(position.size);
        if !(size > 0.0 && size <= position.size) {
            return Err(BrokerError::InvalidCloseSize {
                requested: size,
                position: position.size,
            });
        }

        let request = ClosePositionRequest {
            deal_id: position.deal_id.clone(),
            direction: position.direction.opposite(),
            size,
            order_type: "MARKET".to_string(),
            time_in_force,
        };
        let reference = self.broker.close_position(&request)?;
        info!("Closed {} of {} on {}", size, position.deal_id, position.epic());
        Ok(reference)
    }

    /// The open position created by a given deal reference.
    pub fn position_by_deal_reference(&self, deal_reference: &str) -> Result<Position, BrokerError> {
        self.broker
            .open_positions()?
            .into_iter()
            .find(|p| p.deal_reference == deal_reference)
            .ok_or_else(|| BrokerError::NotFound(format!("position with deal reference {deal_reference}")))
    }

    fn check_new(&self, instrument: &MarketInstrument, intent: &OrderIntent) -> Result<(), BrokerError> {
        let quote = quote_of(instrument)?;
        let rules = self.broker.dealing_rules(&instrument.epic)?;
        OrderValidator::new(&rules)
            .check_new(intent, quote)
            .inspect_err(|e| reject(&instrument.epic, e))?;
        Ok(())
    }
}

fn ensure_open(instrument: &MarketInstrument) -> Result<(), BrokerError> {
    if instrument.is_closed() {
        return Err(BrokerError::MarketClosed {
            epic: instrument.epic.clone(),
        });
    }
    Ok(())
}

fn quote_of(instrument: &MarketInstrument) -> Result<Quote, BrokerError> {
    instrument.quote().ok_or_else(|| BrokerError::NoQuote {
        epic: instrument.epic.clone(),
    })
}

fn reject(epic: &str, error: &ValidationError) {
    warn!("Rejected order on {epic}: {error}");
}
