//! Per-instrument dealing rules.
//!
//! The broker publishes, for every market, the bounds an order must respect:
//! minimum deal size, minimum and maximum stop/limit distance, and the minimum
//! step of a trailing stop. [`DealingRules`] is an immutable snapshot of those
//! bounds. It can only be built from a complete set of fields; a missing or
//! negative threshold is rejected with [`RulesError`] instead of defaulting.

use std::fmt;

use crate::error::RulesError;

/// Dimension of a dealing-rule value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum Unit {
    Points,
    Percentage,
    /// Any tag this crate does not know about, kept verbatim.
    Other(String),
}

impl Unit {
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Points => "POINTS",
            Unit::Percentage => "PERCENTAGE",
            Unit::Other(tag) => tag,
        }
    }
}

impl From<String> for Unit {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "POINTS" => Unit::Points,
            "PERCENTAGE" => Unit::Percentage,
            _ => Unit::Other(tag),
        }
    }
}

impl From<&str> for Unit {
    fn from(tag: &str) -> Self {
        Unit::from(tag.to_string())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bound: a value and the unit it is expressed in.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnitValue {
    pub unit: Unit,
    pub value: f64,
}

impl UnitValue {
    pub fn new(unit: Unit, value: f64) -> Self {
        Self { unit, value }
    }

    /// A bound expressed in points.
    pub fn points(value: f64) -> Self {
        Self::new(Unit::Points, value)
    }
}

impl From<f64> for UnitValue {
    fn from(value: f64) -> Self {
        UnitValue::points(value)
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Unit/value pair as it arrives on the wire, both halves optional.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct RawUnitValue {
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
}

impl From<UnitValue> for RawUnitValue {
    fn from(uv: UnitValue) -> Self {
        Self {
            unit: Some(uv.unit.into()),
            value: Some(uv.value),
        }
    }
}

/// Unvalidated dealing rules, e.g. the `dealingRules` object of a market
/// details response. Convert with `DealingRules::try_from`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawDealingRules {
    pub market_order_preference: Option<String>,
    pub max_stop_or_limit_distance: Option<RawUnitValue>,
    pub min_controlled_risk_stop_distance: Option<RawUnitValue>,
    pub min_deal_size: Option<RawUnitValue>,
    #[cfg_attr(feature = "serde", serde(rename = "minNormalStopOrLimitDistance"))]
    pub min_stop_or_limit_distance: Option<RawUnitValue>,
    pub min_step_distance: Option<RawUnitValue>,
    #[cfg_attr(feature = "serde", serde(rename = "trailingStopsPreference"))]
    pub trailing_stop_preference: Option<String>,
}

/// Immutable snapshot of one instrument's dealing rules.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", try_from = "RawDealingRules")
)]
pub struct DealingRules {
    market_order_preference: String,
    max_stop_or_limit_distance: UnitValue,
    min_controlled_risk_stop_distance: UnitValue,
    min_deal_size: UnitValue,
    #[cfg_attr(feature = "serde", serde(rename = "minNormalStopOrLimitDistance"))]
    min_stop_or_limit_distance: UnitValue,
    min_step_distance: UnitValue,
    #[cfg_attr(feature = "serde", serde(rename = "trailingStopsPreference"))]
    trailing_stop_preference: String,
}

impl DealingRules {
    /// Start building rules field by field.
    pub fn builder() -> DealingRulesBuilder {
        DealingRulesBuilder::default()
    }

    pub fn market_order_preference(&self) -> &str {
        &self.market_order_preference
    }

    pub fn max_stop_or_limit_distance(&self) -> &UnitValue {
        &self.max_stop_or_limit_distance
    }

    pub fn min_controlled_risk_stop_distance(&self) -> &UnitValue {
        &self.min_controlled_risk_stop_distance
    }

    pub fn min_deal_size(&self) -> &UnitValue {
        &self.min_deal_size
    }

    pub fn min_stop_or_limit_distance(&self) -> &UnitValue {
        &self.min_stop_or_limit_distance
    }

    pub fn min_step_distance(&self) -> &UnitValue {
        &self.min_step_distance
    }

    pub fn trailing_stop_preference(&self) -> &str {
        &self.trailing_stop_preference
    }
}

impl fmt::Display for DealingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DEALING RULES:")?;
        writeln!(f, "  Market order preference:   {}", self.market_order_preference)?;
        writeln!(f, "  Trailing stop preference:  {}", self.trailing_stop_preference)?;
        writeln!(f, "  Min deal size:             {}", self.min_deal_size)?;
        writeln!(f, "  Min stop/limit distance:   {}", self.min_stop_or_limit_distance)?;
        writeln!(f, "  Max stop/limit distance:   {}", self.max_stop_or_limit_distance)?;
        writeln!(
            f,
            "  Min guaranteed stop dist.: {}",
            self.min_controlled_risk_stop_distance
        )?;
        writeln!(f, "  Min trailing step:         {}", self.min_step_distance)
    }
}

fn require_text(field: &'static str, value: Option<String>) -> Result<String, RulesError> {
    value.ok_or(RulesError::MissingField(field))
}

fn require_bound(
    field: &'static str,
    raw: Option<RawUnitValue>,
) -> Result<UnitValue, RulesError> {
    let raw = raw.ok_or(RulesError::MissingField(field))?;
    let unit = raw.unit.ok_or(RulesError::MissingField(field))?;
    let value = raw.value.ok_or(RulesError::MissingField(field))?;
    if !value.is_finite() || value < 0.0 {
        return Err(RulesError::InvalidValue { field, value });
    }
    Ok(UnitValue::new(Unit::from(unit), value))
}

impl TryFrom<RawDealingRules> for DealingRules {
    type Error = RulesError;

    fn try_from(raw: RawDealingRules) -> Result<Self, Self::Error> {
        Ok(Self {
            market_order_preference: require_text(
                "marketOrderPreference",
                raw.market_order_preference,
            )?,
            max_stop_or_limit_distance: require_bound(
                "maxStopOrLimitDistance",
                raw.max_stop_or_limit_distance,
            )?,
            min_controlled_risk_stop_distance: require_bound(
                "minControlledRiskStopDistance",
                raw.min_controlled_risk_stop_distance,
            )?,
            min_deal_size: require_bound("minDealSize", raw.min_deal_size)?,
            min_stop_or_limit_distance: require_bound(
                "minNormalStopOrLimitDistance",
                raw.min_stop_or_limit_distance,
            )?,
            min_step_distance: require_bound("minStepDistance", raw.min_step_distance)?,
            trailing_stop_preference: require_text(
                "trailingStopsPreference",
                raw.trailing_stop_preference,
            )?,
        })
    }
}

/// Builder for [`DealingRules`]. Every field must be set before `build`.
#[derive(Clone, Debug, Default)]
pub struct DealingRulesBuilder {
    raw: RawDealingRules,
}

impl DealingRulesBuilder {
    pub fn market_order_preference(mut self, preference: &str) -> Self {
        self.raw.market_order_preference = Some(preference.to_string());
        self
    }

    pub fn trailing_stop_preference(mut self, preference: &str) -> Self {
        self.raw.trailing_stop_preference = Some(preference.to_string());
        self
    }

    pub fn max_stop_or_limit_distance(mut self, bound: impl Into<UnitValue>) -> Self {
        self.raw.max_stop_or_limit_distance = Some(bound.into().into());
        self
    }

    pub fn min_controlled_risk_stop_distance(mut self, bound: impl Into<UnitValue>) -> Self {
        self.raw.min_controlled_risk_stop_distance = Some(bound.into().into());
        self
    }

    pub fn min_deal_size(mut self, bound: impl Into<UnitValue>) -> Self {
        self.raw.min_deal_size = Some(bound.into().into());
        self
    }

    pub fn min_stop_or_limit_distance(mut self, bound: impl Into<UnitValue>) -> Self {
        self.raw.min_stop_or_limit_distance = Some(bound.into().into());
        self
    }

    pub fn min_step_distance(mut self, bound: impl Into<UnitValue>) -> Self {
        self.raw.min_step_distance = Some(bound.into().into());
        self
    }

    pub fn build(self) -> Result<DealingRules, RulesError> {
        DealingRules::try_from(self.raw)
    }
}
