//! Command implementations: log in, validate, confirm, submit, audit.
//!
//! The order-entry steps are generic over [`Broker`] so they run the same
//! against the live client and the mock broker.

use chrono::Utc;
use igkit::{Direction, LimitLeg, OrderIntent, OrderParams, StopLeg};
use igkit_broker::ig::IgClient;
use igkit_broker::{
    Broker, DealOptions, DealReference, Dealer, MarketInstrument, Position,
    TimeInForce,
};
use log::{info, warn};

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};

/// Order flags of the `open` command.
#[derive(Clone, Debug, Default)]
pub struct OpenOrder {
    pub epic: String,
    pub direction: Option<Direction>,
    pub size: f64,
    pub limit_distance: Option<f64>,
    pub limit_level: Option<f64>,
    pub stop_distance: Option<f64>,
    pub stop_level: Option<f64>,
    pub trailing_increment: Option<f64>,
    /// Deal reference to submit under; generated when absent.
    pub deal_reference: Option<String>,
}

impl OpenOrder {
    /// The loose parameter set, exactly as given on the command line.
    pub fn params(&self) -> Result<OrderParams> {
        let direction = self
            .direction
            .ok_or_else(|| Error::Input("--direction is required".into()))?;
        Ok(OrderParams {
            direction,
            size: self.size,
            limit_distance: self.limit_distance,
            limit_level: self.limit_level,
            stop_distance: self.stop_distance,
            stop_level: self.stop_level,
            stop_increment: self.trailing_increment,
        })
    }
}

/// How far an `open` goes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Validate and stop.
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub force: bool,
}

/// What became of an `open`.
#[derive(Clone, Debug, PartialEq)]
pub enum OpenOutcome {
    DryRun(OrderIntent),
    Declined,
    Submitted(DealReference),
}

/// Log in, switching to the configured account if it is not the current one.
pub fn connect(config: &Config) -> Result<IgClient> {
    let mut client = IgClient::new(
        config.credentials()?,
        config.connection.environment,
        config.timeout(),
    )?;
    let current = client.authenticate()?.id.clone();
    if let Some(id) = config.account.id.as_deref().filter(|id| *id != current) {
        info!("Switching from account {current} to {id}");
        client.switch_account(id)?;
    }
    Ok(client)
}

fn connect_audited(config: &Config) -> Result<(IgClient, AuditLog)> {
    let client = connect(config)?;
    let mut audit = AuditLog::open(&config.audit_path())?;
    if let Some(account) = client.account() {
        audit::log_session(&mut audit, account)?;
    }
    Ok((client, audit))
}

/// Ask the user a yes/no question on the terminal (default: no).
pub fn prompt(question: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .map_err(|e| Error::Prompt(e.to_string()))
}

/// `igctl status`
pub fn check_status(config: &Config) -> Result<()> {
    print!("Logging in to IG ({})... ", config.connection.environment);
    let client = connect(config)?;
    println!("OK\n");
    if let Some(account) = client.account() {
        print!("{}", account.summary());
    }
    Ok(())
}

/// `igctl positions`
pub fn show_positions(config: &Config) -> Result<()> {
    let client = connect(config)?;
    let positions = Broker::open_positions(&client)?;
    display_positions(&positions);

    let orders = Broker::working_orders(&client)?;
    if !orders.is_empty() {
        println!("\nWORKING ORDERS:");
        for o in &orders {
            println!(
                "  {:24} {:4} {:>8} @ {:>10.2}  {} {}",
                o.epic, o.direction, o.order_size, o.order_level, o.order_type, o.time_in_force,
            );
        }
    }
    Ok(())
}

/// `igctl rules <epic>`
pub fn show_rules(config: &Config, epic: &str) -> Result<()> {
    let client = connect(config)?;
    let rules = Broker::dealing_rules(&client, epic)?;
    println!("Dealing rules for {epic}:");
    println!("{rules}");
    Ok(())
}

/// `igctl search <term>`
pub fn search(config: &Config, term: &str) -> Result<()> {
    let client = connect(config)?;
    let markets = client.search_markets(term)?;
    if markets.is_empty() {
        println!("No markets match \"{term}\".");
        return Ok(());
    }
    for m in &markets {
        display_market(m);
    }
    Ok(())
}

/// `igctl watchlists [name]`
pub fn show_watchlists(config: &Config, name: Option<&str>) -> Result<()> {
    let client = connect(config)?;
    match name {
        Some(name) => {
            let markets = client.watchlist_markets(name)?;
            println!("{name}: {} market(s)", markets.len());
            for m in &markets {
                display_market(m);
            }
        }
        None => {
            let watchlists = client.watchlists()?;
            if watchlists.is_empty() {
                println!("No watchlists.");
            }
            for w in &watchlists {
                let flag = if w.editable { "" } else { " (read-only)" };
                println!("  {:16} {}{flag}", w.id, w.name);
            }
        }
    }
    Ok(())
}

/// `igctl open ...`
pub fn open(config: &Config, order: &OpenOrder, opts: RunOptions) -> Result<()> {
    let (client, mut audit) = connect_audited(config)?;
    let dealer = Dealer::new(client);
    let outcome = open_order(
        &dealer,
        &mut audit,
        order,
        &config.deal_options(),
        opts,
        prompt,
    )?;
    match outcome {
        OpenOutcome::DryRun(_) => println!("\n[DRY RUN] Order is valid, nothing submitted."),
        OpenOutcome::Declined => println!("Aborted."),
        OpenOutcome::Submitted(reference) => {
            println!("Submitted, deal reference {reference}");
            match dealer.position_by_deal_reference(&reference.deal_reference) {
                Ok(position) => display_positions(std::slice::from_ref(&position)),
                Err(e) => warn!("Could not look up the new position: {e}"),
            }
            println!("Audit logged to {}", config.audit_path().display());
        }
    }
    Ok(())
}

/// Validate an order against live dealing rules, then confirm and submit it.
///
/// Every decision is audited. `confirm` is only asked when neither
/// `dry_run` nor `force` is set.
pub fn open_order<B: Broker>(
    dealer: &Dealer<B>,
    audit: &mut AuditLog,
    order: &OpenOrder,
    options: &DealOptions,
    opts: RunOptions,
    confirm: impl FnOnce(&str) -> Result<bool>,
) -> Result<OpenOutcome> {
    let params = order.params()?;
    let market = dealer.broker().market(&order.epic)?;

    let checked = match dealer.check_market_order(&market, &params) {
        Ok(checked) => checked,
        Err(e) => {
            audit::log_order_rejected(audit, &market.epic, &e)?;
            return Err(e.into());
        }
    };
    audit::log_order_validated(audit, &market.epic, checked.intent())?;
    display_plan(checked.market(), checked.intent(), options);

    if opts.dry_run {
        return Ok(OpenOutcome::DryRun(checked.intent().clone()));
    }

    if !opts.force {
        let approved = confirm("Submit order?")?;
        audit.log("user_confirmed", serde_json::json!({ "approved": approved }))?;
        if !approved {
            return Ok(OpenOutcome::Declined);
        }
    }

    let deal_reference = order
        .deal_reference
        .clone()
        .unwrap_or_else(new_deal_reference);
    match dealer.submit_checked(&deal_reference, &checked, options) {
        Ok(reference) => {
            audit::log_order_submitted(audit, &market.epic, checked.intent(), &reference)?;
            Ok(OpenOutcome::Submitted(reference))
        }
        Err(e) => {
            audit::log_order_rejected(audit, &market.epic, &e)?;
            Err(e.into())
        }
    }
}

/// `igctl close <deal-ref> [--size]`
pub fn close(config: &Config, deal_reference: &str, size: Option<f64>) -> Result<()> {
    let (client, mut audit) = connect_audited(config)?;
    let dealer = Dealer::new(client);
    let reference = close_by_reference(
        &dealer,
        &mut audit,
        deal_reference,
        size,
        config.dealing.time_in_force,
    )?;
    println!("Closed, deal reference {reference}");
    Ok(())
}

/// Close (part of) the position opened under `deal_reference`.
pub fn close_by_reference<B: Broker>(
    dealer: &Dealer<B>,
    audit: &mut AuditLog,
    deal_reference: &str,
    size: Option<f64>,
    time_in_force: TimeInForce,
) -> Result<DealReference> {
    let position = dealer.position_by_deal_reference(deal_reference)?;
    match dealer.close_position(&position, size, time_in_force) {
        Ok(reference) => {
            let closed = size.unwrap_or(position.size);
            audit::log_position_closed(audit, &position.deal_id, closed, &reference)?;
            Ok(reference)
        }
        Err(e) => {
            audit::log_order_rejected(audit, position.epic(), &e)?;
            Err(e.into())
        }
    }
}

/// Client deal references are at most 30 characters of `[A-Za-z0-9_-]`.
fn new_deal_reference() -> String {
    format!("IGCTL{}", Utc::now().format("%Y%m%d%H%M%S%3f"))
}

fn display_market(m: &MarketInstrument) {
    let price = |p: Option<f64>| p.map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
    println!(
        "  {:28} {:32} {:>10} / {:<10} {:?}",
        m.epic,
        m.instrument_name,
        price(m.bid),
        price(m.offer),
        m.market_status,
    );
}

fn display_positions(positions: &[Position]) {
    if positions.is_empty() {
        println!("No open positions.");
        return;
    }

    println!("OPEN POSITIONS:");
    for p in positions {
        let level = |l: Option<f64>| l.map_or_else(|| "-".to_string(), |l| format!("{l:.2}"));
        let trailing = if p.is_trailing() { " trailing" } else { "" };
        println!(
            "  {:16} {:24} {:4} {:>8} @ {:>10.2}  limit {:>10}  stop {:>10}{trailing}  [{}]",
            p.deal_id,
            p.epic(),
            p.direction,
            p.size,
            p.level,
            level(p.limit_level),
            level(p.stop_level),
            p.deal_reference,
        );
    }
}

fn display_plan(market: &MarketInstrument, intent: &OrderIntent, options: &DealOptions) {
    let limit = match intent.limit {
        Some(LimitLeg::Level(l)) => format!("level {l}"),
        Some(LimitLeg::Distance(d)) => format!("distance {d}"),
        None => "none".to_string(),
    };
    let stop = match intent.stop {
        Some(StopLeg::Level(l)) => format!("level {l}"),
        Some(StopLeg::Distance(d)) => format!("distance {d}"),
        None => "none".to_string(),
    };
    println!(
        "ORDER: {} {} {} ({}) at market, {} {}",
        intent.direction,
        intent.size,
        market.epic,
        market.instrument_name,
        options.currency_code,
        options.time_in_force,
    );
    println!("  limit: {limit}");
    println!("  stop:  {stop}");
    if let Some(increment) = intent.stop_increment {
        println!("  trailing, step {increment}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_keep_both_forms_for_the_validator() {
        let order = OpenOrder {
            epic: "IX.D.FTSE.DAILY.IP".into(),
            direction: Some(Direction::Sell),
            size: 1.0,
            limit_distance: Some(5.0),
            limit_level: Some(110.0),
            ..Default::default()
        };
        let params = order.params().unwrap();
        assert_eq!(params.limit_distance, Some(5.0));
        assert_eq!(params.limit_level, Some(110.0));
        assert!(params.to_intent().is_err());
    }

    #[test]
    fn params_need_a_direction() {
        assert!(matches!(
            OpenOrder::default().params(),
            Err(Error::Input(_))
        ));
    }

    #[test]
    fn generated_references_fit_ig_limits() {
        let reference = new_deal_reference();
        assert!(reference.len() <= 30);
        assert!(reference.starts_with("IGCTL"));
        assert!(reference.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
