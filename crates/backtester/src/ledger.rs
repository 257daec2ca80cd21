use crate::error::BacktestError;
use chrono::{DateTime, Utc};
use core_types::PortfolioState;
use rust_decimal::Decimal;

/// The state carried from one simulated row to the next.
///
/// Its only job is to apply one target exposure at one price and report the
/// resulting row. It is `Copy` and `apply` takes `self` by value, so the whole
/// simulation is a fold with no hidden state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ledger {
    pub cash: Decimal,
    /// Exposure held after the previous row. `None` before the first row.
    pub exposure: Option<Decimal>,
    /// Equity after the previous row. `None` before the first row.
    pub total_equity: Option<Decimal>,
}

impl Ledger {
    /// Creates a new `Ledger` holding only cash.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            cash: initial_capital,
            exposure: None,
            total_equity: None,
        }
    }

    /// Moves to `target_exposure` at `price` and returns the next ledger with the row.
    ///
    /// `cash[t] = cash[t-1] - (exposure[t] - exposure[t-1]) * price[t]`. The first
    /// row has no prior exposure, so its delta is zero and cash is untouched.
    /// No cash, margin or short-selling limit is enforced.
    pub fn apply(
        self,
        timestamp: DateTime<Utc>,
        price: Decimal,
        target_exposure: Decimal,
    ) -> Result<(Ledger, PortfolioState), BacktestError> {
        let overflow = || BacktestError::Overflow(timestamp.to_string());

        let position_delta = match self.exposure {
            Some(previous) => target_exposure.checked_sub(previous).ok_or_else(overflow)?,
            None => Decimal::ZERO,
        };

        let cash = if position_delta.is_zero() {
            self.cash
        } else {
            let cost = position_delta.checked_mul(price).ok_or_else(overflow)?;
            self.cash.checked_sub(cost).ok_or_else(overflow)?
        };

        let position_value = target_exposure.checked_mul(price).ok_or_else(overflow)?;
        let total_equity = position_value.checked_add(cash).ok_or_else(overflow)?;

        let returns = match self.total_equity {
            Some(previous) if !previous.is_zero() => Some(
                total_equity
                    .checked_div(previous)
                    .ok_or_else(overflow)?
                    - Decimal::ONE,
            ),
            _ => None,
        };

        let state = PortfolioState {
            timestamp,
            price,
            exposure: target_exposure,
            position_delta,
            position_value,
            cash,
            total_equity,
            returns,
        };

        let next = Ledger {
            cash,
            exposure: Some(target_exposure),
            total_equity: Some(total_equity),
        };

        Ok((next, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn first_row_never_moves_cash() {
        let (next, state) = Ledger::new(dec!(1000)).apply(ts(), dec!(25), dec!(1)).unwrap();

        assert_eq!(state.position_delta, dec!(0));
        assert_eq!(state.cash, dec!(1000));
        assert_eq!(state.position_value, dec!(25));
        assert_eq!(state.total_equity, dec!(1025));
        assert_eq!(state.returns, None);
        assert_eq!(next.exposure, Some(dec!(1)));
    }

    #[test]
    fn exposure_change_moves_cash_by_delta_times_price() {
        let ledger = Ledger {
            cash: dec!(1000),
            exposure: Some(dec!(1)),
            total_equity: Some(dec!(1010)),
        };

        // Flip from long to short: delta -2 at price 12 adds 24 cash.
        let (next, state) = ledger.apply(ts(), dec!(12), dec!(-1)).unwrap();
        assert_eq!(state.position_delta, dec!(-2));
        assert_eq!(state.cash, dec!(1024));
        assert_eq!(state.position_value, dec!(-12));
        assert_eq!(state.total_equity, dec!(1012));
        assert_eq!(state.returns, Some(dec!(1012) / dec!(1010) - dec!(1)));
        assert_eq!(next.cash, dec!(1024));
    }

    #[test]
    fn zero_prior_equity_leaves_return_undefined() {
        let ledger = Ledger {
            cash: dec!(-10),
            exposure: Some(dec!(1)),
            total_equity: Some(dec!(0)),
        };
        let (_, state) = ledger.apply(ts(), dec!(11), dec!(1)).unwrap();
        assert_eq!(state.total_equity, dec!(1));
        assert_eq!(state.returns, None);
    }
}
