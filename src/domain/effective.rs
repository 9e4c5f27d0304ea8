// SPDX-License-Identifier: MIT OR Apache-2.0

//! Effective value computation.

use crate::ports::Layered;

/// Folds a stack of overlays onto an immutable base value.
///
/// Every computation starts again from the base, so the result only depends on
/// the overlays passed in and their order, never on earlier computations.
///
/// # Examples
///
/// ```rust
/// use layerbroker::domain::EffectiveCalculator;
/// # use layerbroker::ports::{Layered, PathSet};
/// # #[derive(Debug, Clone, PartialEq)]
/// # struct Limits { max: u32, min: u32 }
/// # #[derive(Debug, Clone, Default)]
/// # struct LimitsPartial { max: Option<u32>, min: Option<u32> }
/// # impl Layered for Limits {
/// #     type Partial = LimitsPartial;
/// #     fn merge(&self, o: &LimitsPartial) -> Self {
/// #         Limits { max: o.max.unwrap_or(self.max), min: o.min.unwrap_or(self.min) }
/// #     }
/// #     fn deep_copy(&self) -> Self { self.clone() }
/// #     fn copy_partial(o: &LimitsPartial) -> LimitsPartial { o.clone() }
/// #     fn equal(&self, other: &Self) -> bool { self == other }
/// #     fn paths() -> PathSet<Self> { PathSet::new() }
/// # }
///
/// let calculator = EffectiveCalculator::new(Limits { max: 10, min: 0 });
/// let overlays = [
///     LimitsPartial { max: Some(20), min: None },
///     LimitsPartial { max: Some(30), min: Some(5) },
/// ];
/// assert_eq!(calculator.compute(overlays.iter()), Limits { max: 30, min: 5 });
/// assert_eq!(calculator.base(), &Limits { max: 10, min: 0 });
/// ```
#[derive(Debug)]
pub struct EffectiveCalculator<T> {
    base: T,
}

impl<T: Layered> EffectiveCalculator<T> {
    /// Creates a calculator over the given base value.
    pub fn new(base: T) -> Self {
        Self { base }
    }

    /// The base value every computation starts from.
    pub fn base(&self) -> &T {
        &self.base
    }

    /// Applies `overlays` in iteration order, lowest precedence first.
    pub fn compute<'a, I>(&self, overlays: I) -> T
    where
        I: IntoIterator<Item = &'a T::Partial>,
    {
        overlays
            .into_iter()
            .fold(self.base.deep_copy(), |acc, overlay| acc.merge(overlay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ServerConfig, ServerConfigPartial, TlsConfig, TlsConfigPartial};

    #[test]
    fn test_no_overlays_yields_base() {
        let calculator = EffectiveCalculator::new(ServerConfig::new("default", 8080));
        let effective = calculator.compute(std::iter::empty());
        assert_eq!(effective, ServerConfig::new("default", 8080));
    }

    #[test]
    fn test_later_overlays_win() {
        let calculator = EffectiveCalculator::new(ServerConfig::new("default", 8080));
        let overlays = [ServerConfigPartial::port(9090), ServerConfigPartial::port(7070)];
        assert_eq!(calculator.compute(overlays.iter()).port, 7070);
    }

    #[test]
    fn test_unset_fields_pass_through() {
        let calculator = EffectiveCalculator::new(ServerConfig::new("default", 8080));
        let overlays = [
            ServerConfigPartial::name("from-file"),
            ServerConfigPartial::port(9090),
        ];
        assert_eq!(
            calculator.compute(overlays.iter()),
            ServerConfig::new("from-file", 9090)
        );
    }

    #[test]
    fn test_nested_optional_recurses() {
        let calculator = EffectiveCalculator::new(ServerConfig::new("default", 8080));
        let overlays = [
            ServerConfigPartial {
                tls: Some(TlsConfigPartial {
                    cert: Some("a.pem".to_string()),
                    verify: None,
                }),
                ..Default::default()
            },
            ServerConfigPartial {
                tls: Some(TlsConfigPartial {
                    cert: None,
                    verify: Some(true),
                }),
                ..Default::default()
            },
        ];
        assert_eq!(
            calculator.compute(overlays.iter()).tls,
            Some(TlsConfig {
                cert: "a.pem".to_string(),
                verify: true,
            })
        );
    }

    #[test]
    fn test_base_is_never_mutated() {
        let calculator = EffectiveCalculator::new(ServerConfig::new("default", 8080));
        let overlays = [ServerConfigPartial::port(1)];
        let _ = calculator.compute(overlays.iter());
        assert_eq!(calculator.base(), &ServerConfig::new("default", 8080));
    }
}
