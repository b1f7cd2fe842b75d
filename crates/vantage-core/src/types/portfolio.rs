//! Positions and portfolio snapshots.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::error::{CoreError, CoreResult};

/// A single holding valued at the latest known price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Asset identifier.
    pub symbol: Symbol,
    /// Signed quantity (negative for short positions).
    pub quantity: Decimal,
    /// Average entry price.
    #[serde(default)]
    pub average_price: Decimal,
    /// Quantity times current price.
    pub market_value: Decimal,
    /// Unrealized profit and loss.
    #[serde(default)]
    pub unrealized_pnl: Decimal,
}

impl Position {
    /// Creates a position from explicit valuation fields.
    pub fn new(
        symbol: impl Into<Symbol>,
        quantity: Decimal,
        average_price: Decimal,
        market_value: Decimal,
        unrealized_pnl: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
            market_value,
            unrealized_pnl,
        }
    }

    /// Creates a position valued at `current_price`.
    ///
    /// `market_value = quantity × current_price` and
    /// `unrealized_pnl = (current_price − average_price) × quantity`.
    pub fn priced(
        symbol: impl Into<Symbol>,
        quantity: Decimal,
        average_price: Decimal,
        current_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
            market_value: quantity * current_price,
            unrealized_pnl: (current_price - average_price) * quantity,
        }
    }

    /// Creates a position known only by its market value.
    ///
    /// Quantity is set to one unit priced at the market value.
    pub fn from_market_value(symbol: impl Into<Symbol>, market_value: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: Decimal::ONE,
            average_price: market_value,
            market_value,
            unrealized_pnl: Decimal::ZERO,
        }
    }

    /// Returns true for short positions.
    pub fn is_short(&self) -> bool {
        self.quantity.is_sign_negative() && !self.quantity.is_zero()
    }

    /// Market value as `f64`.
    pub fn market_value_f64(&self) -> f64 {
        self.market_value.to_f64().unwrap_or(0.0)
    }
}

/// Aggregated market value held in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exposure {
    /// Asset identifier.
    pub symbol: Symbol,
    /// Signed market value across all positions in the symbol.
    pub market_value: f64,
}

/// A named, read-only collection of positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Portfolio name.
    #[serde(default)]
    pub name: String,
    /// Positions held.
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl Portfolio {
    /// Creates an empty portfolio.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
        }
    }

    /// Builds a portfolio from a symbol → market value map.
    ///
    /// Fails when a value is NaN, infinite, or outside the `Decimal` range.
    pub fn from_exposures<I, S>(name: impl Into<String>, exposures: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Symbol>,
    {
        let positions = exposures
            .into_iter()
            .map(|(symbol, value)| {
                let symbol = symbol.into();
                match Decimal::from_f64_retain(value) {
                    Some(market_value) => Ok(Position::from_market_value(symbol, market_value)),
                    None => Err(CoreError::invalid_position(
                        symbol.as_str(),
                        format!("market value {value} is not a representable amount"),
                    )),
                }
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            positions,
        })
    }

    /// Builder method to add a position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    /// Returns true if the portfolio has no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the number of positions.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Total signed market value.
    pub fn total_market_value(&self) -> Decimal {
        self.positions.iter().map(|p| p.market_value).sum()
    }

    /// Baseline value risk is measured against.
    pub fn baseline_value(&self) -> f64 {
        self.total_market_value().to_f64().unwrap_or(0.0)
    }

    /// Sum of absolute market values.
    pub fn gross_exposure(&self) -> f64 {
        self.positions
            .iter()
            .map(|p| p.market_value_f64().abs())
            .sum()
    }

    /// Market value per symbol, in order of first appearance.
    ///
    /// Positions sharing a symbol are summed.
    pub fn exposures(&self) -> Vec<Exposure> {
        let mut exposures: Vec<Exposure> = Vec::with_capacity(self.positions.len());
        for position in &self.positions {
            match exposures.iter_mut().find(|e| e.symbol == position.symbol) {
                Some(existing) => existing.market_value += position.market_value_f64(),
                None => exposures.push(Exposure {
                    symbol: position.symbol.clone(),
                    market_value: position.market_value_f64(),
                }),
            }
        }
        exposures
    }

    /// Distinct symbols in order of first appearance.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.exposures().into_iter().map(|e| e.symbol).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_priced_position() {
        let position = Position::priced("BTC-USD", dec!(2), dec!(100), dec!(110));
        assert_eq!(position.market_value, dec!(220));
        assert_eq!(position.unrealized_pnl, dec!(20));
        assert!(!position.is_short());
    }

    #[test]
    fn test_short_position_pnl() {
        let position = Position::priced("ETH-USD", dec!(-3), dec!(50), dec!(40));
        assert_eq!(position.market_value, dec!(-120));
        assert_eq!(position.unrealized_pnl, dec!(30));
        assert!(position.is_short());
    }

    #[test]
    fn test_exposures_aggregate_and_keep_order() {
        let portfolio = Portfolio::new("test")
            .with_position(Position::from_market_value("B", dec!(100)))
            .with_position(Position::from_market_value("A", dec!(50)))
            .with_position(Position::from_market_value("B", dec!(-30)));

        let exposures = portfolio.exposures();
        assert_eq!(exposures.len(), 2);
        assert_eq!(exposures[0].symbol.as_str(), "B");
        assert_relative_eq!(exposures[0].market_value, 70.0);
        assert_eq!(exposures[1].symbol.as_str(), "A");
        assert_relative_eq!(portfolio.baseline_value(), 120.0);
        assert_relative_eq!(portfolio.gross_exposure(), 180.0);
    }

    #[test]
    fn test_from_exposures() {
        let portfolio = Portfolio::from_exposures("legacy", vec![("A", 10_000.0), ("B", 5_000.0)]).unwrap();
        assert_eq!(portfolio.position_count(), 2);
        assert_relative_eq!(portfolio.baseline_value(), 15_000.0);
    }

    #[test]
    fn test_unrepresentable_exposure_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e40] {
            let err = Portfolio::from_exposures("bad", [("A", 1_000.0), ("B", bad)]).unwrap_err();
            assert!(matches!(err, CoreError::InvalidPosition { ref symbol, .. } if symbol == "B"));
        }
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = r#"{
            "name": "wire",
            "positions": [
                {"symbol": "BTC-USD", "quantity": 1.5, "averagePrice": 100.0, "marketValue": 150.0, "unrealizedPnl": 0.0}
            ]
        }"#;
        let portfolio: Portfolio = serde_json::from_str(json).unwrap();
        assert_eq!(portfolio.positions[0].symbol.as_str(), "BTC-USD");
        assert_eq!(portfolio.positions[0].market_value, dec!(150));
    }
}
