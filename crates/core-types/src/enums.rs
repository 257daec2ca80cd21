use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The trading intent carried by a single signal row.
///
/// The simulator reads the intent as a target exposure: `Buy` holds one unit,
/// `Sell` holds minus one unit, `Hold` stays flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalAction {
    Sell,
    Hold,
    Buy,
}

impl SignalAction {
    /// Returns the signed exposure, in units of the underlying, for this intent.
    pub fn exposure(&self) -> Decimal {
        match self {
            SignalAction::Sell => Decimal::NEGATIVE_ONE,
            SignalAction::Hold => Decimal::ZERO,
            SignalAction::Buy => Decimal::ONE,
        }
    }

    /// Maps a signed value back to an intent by its sign.
    pub fn from_sign(value: Decimal) -> Self {
        if value.is_zero() {
            SignalAction::Hold
        } else if value.is_sign_positive() {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalAction::Sell => "Sell",
            SignalAction::Hold => "Hold",
            SignalAction::Buy => "Buy",
        };
        f.write_str(label)
    }
}

/// Identifies one of the available signal generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    #[serde(rename = "ma_crossover")]
    MACrossover,
    Rsi,
    VolumeSpike,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [
        StrategyId::MACrossover,
        StrategyId::Rsi,
        StrategyId::VolumeSpike,
    ];
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrategyId::MACrossover => "MA Crossover",
            StrategyId::Rsi => "RSI",
            StrategyId::VolumeSpike => "Volume Spike",
        };
        f.write_str(label)
    }
}
