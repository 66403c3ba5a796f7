//! Deal direction: Buy or Sell

use std::fmt;

/// Direction of a deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Returns the opposite direction (the one that closes a position).
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }

    /// Wire name used by the dealing API.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            other => Err(format!("unknown direction '{other}', expected BUY or SELL")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite() {
        assert_eq!(Direction::Buy.opposite(), Direction::Sell);
        assert_eq!(Direction::Sell.opposite(), Direction::Buy);
    }

    #[test]
    fn opposite_is_involution() {
        assert_eq!(Direction::Buy.opposite().opposite(), Direction::Buy);
        assert_eq!(Direction::Sell.opposite().opposite(), Direction::Sell);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Direction::Buy), "BUY");
        assert_eq!(format!("{}", Direction::Sell), "SELL");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("buy".parse::<Direction>(), Ok(Direction::Buy));
        assert_eq!("SELL".parse::<Direction>(), Ok(Direction::Sell));
        assert!("hold".parse::<Direction>().is_err());
    }
}
