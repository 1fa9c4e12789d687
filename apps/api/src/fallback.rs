//! Ordered fallback chains: "try A, else B, else C".
//!
//! Strategies are pure functions over a shared input. They run lazily in
//! priority order and the first accepted result wins; later strategies are
//! never invoked once one is accepted.

use tracing::debug;

/// A named strategy producing an optional result from `I`.
pub struct Strategy<I: ?Sized, T> {
    pub name: &'static str,
    pub run: fn(&I) -> Option<T>,
}

impl<I: ?Sized, T> Strategy<I, T> {
    pub const fn new(name: &'static str, run: fn(&I) -> Option<T>) -> Self {
        Self { name, run }
    }
}

/// Runs `strategies` in order and returns the first result passing `accept`,
/// along with the name of the strategy that produced it.
pub fn first_accepted<I: ?Sized, T>(
    input: &I,
    strategies: &[Strategy<I, T>],
    accept: impl Fn(&T) -> bool,
) -> Option<(&'static str, T)> {
    strategies.iter().find_map(|strategy| {
        let result = (strategy.run)(input).filter(|value| accept(value));
        match &result {
            Some(_) => debug!("Strategy '{}' accepted", strategy.name),
            None => debug!("Strategy '{}' produced nothing usable", strategy.name),
        }
        result.map(|value| (strategy.name, value))
    })
}

/// First non-empty string wins.
pub fn first_non_empty<I: ?Sized>(
    input: &I,
    strategies: &[Strategy<I, String>],
) -> Option<(&'static str, String)> {
    first_accepted(input, strategies, |value| !value.is_empty())
}
