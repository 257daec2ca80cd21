use crate::error::StrategyError;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// A trailing simple mean over a fixed number of observations.
///
/// `next` yields `None` until the window has been filled once, so callers never
/// see a mean computed over a partial window.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<Decimal>,
    sum: Decimal,
}

impl RollingMean {
    pub fn new(window: usize) -> Result<Self, StrategyError> {
        if window == 0 {
            return Err(StrategyError::InvalidParameters(
                "Rolling window length cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            window,
            values: VecDeque::with_capacity(window + 1),
            sum: Decimal::ZERO,
        })
    }

    /// Pushes one observation and returns the mean of the last `window` values, if full.
    pub fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.values.push_back(value);
        self.sum += value;
        if self.values.len() > self.window {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
            }
        }

        if self.is_ready() {
            Some(self.sum / Decimal::from(self.window))
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.values.len() == self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            RollingMean::new(0),
            Err(StrategyError::InvalidParameters(_))
        ));
    }

    #[test]
    fn unavailable_until_window_fills() {
        let mut mean = RollingMean::new(3).unwrap();
        assert_eq!(mean.next(dec!(1)), None);
        assert_eq!(mean.next(dec!(2)), None);
        assert_eq!(mean.next(dec!(3)), Some(dec!(2)));
        assert_eq!(mean.next(dec!(7)), Some(dec!(4)));
    }

    #[test]
    fn window_of_one_is_the_value_itself() {
        let mut mean = RollingMean::new(1).unwrap();
        assert_eq!(mean.next(dec!(5.5)), Some(dec!(5.5)));
        assert_eq!(mean.next(dec!(-2)), Some(dec!(-2)));
    }

    #[test]
    fn evicted_values_leave_no_residue() {
        // 0.1 + 0.2 then zeros: a float accumulator would not return to zero here.
        let mut mean = RollingMean::new(2).unwrap();
        mean.next(dec!(0.1));
        mean.next(dec!(0.2));
        mean.next(dec!(0));
        assert_eq!(mean.next(dec!(0)), Some(Decimal::ZERO));
    }
}
