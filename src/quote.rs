//! Current two-way price of an instrument and level-to-distance translation.

use crate::direction::Direction;

/// Bid/offer snapshot used to turn absolute levels into distances.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quote {
    pub bid: f64,
    pub offer: f64,
}

impl Quote {
    pub fn new(bid: f64, offer: f64) -> Self {
        Self { bid, offer }
    }

    /// Price a level is measured from: the bid for a buy, the offer for a sell.
    #[inline]
    pub fn reference(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Buy => self.bid,
            Direction::Sell => self.offer,
        }
    }

    /// Distance of a limit level from the market. Positive when the level is
    /// on the profitable side (above for a buy, below for a sell).
    #[inline]
    pub fn limit_distance(&self, direction: Direction, level: f64) -> f64 {
        let reference = self.reference(direction);
        match direction {
            Direction::Buy => level - reference,
            Direction::Sell => reference - level,
        }
    }

    /// Distance of a stop level from the market. Positive when the level is
    /// on the losing side (below for a buy, above for a sell).
    #[inline]
    pub fn stop_distance(&self, direction: Direction, level: f64) -> f64 {
        let reference = self.reference(direction);
        match direction {
            Direction::Buy => reference - level,
            Direction::Sell => level - reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_follows_direction() {
        let q = Quote::new(99.0, 101.0);
        assert_eq!(q.reference(Direction::Buy), 99.0);
        assert_eq!(q.reference(Direction::Sell), 101.0);
    }

    #[test]
    fn stop_distance_is_symmetric() {
        let q = Quote::new(100.0, 100.0);
        assert_eq!(q.stop_distance(Direction::Buy, 95.0), 5.0);
        assert_eq!(q.stop_distance(Direction::Sell, 105.0), 5.0);
    }

    #[test]
    fn limit_distance_is_symmetric() {
        let q = Quote::new(100.0, 102.0);
        assert_eq!(q.limit_distance(Direction::Buy, 110.0), 10.0);
        assert_eq!(q.limit_distance(Direction::Sell, 92.0), 10.0);
    }

    #[test]
    fn wrong_side_is_negative() {
        let q = Quote::new(100.0, 100.0);
        assert!(q.limit_distance(Direction::Buy, 90.0) < 0.0);
        assert!(q.stop_distance(Direction::Buy, 105.0) < 0.0);
    }
}
