//! Multiplier Resolution

use rust_decimal::Decimal;
use tracing::trace;

use crate::config::{CalculatorConfig, RangeKey};

/// The dropdown choices in effect for a calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected primary option (1-based)
    pub primary: Option<usize>,

    /// Selected secondary option (1-based)
    pub secondary: Option<usize>,
}

impl Selection {
    /// No dropdown selection.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            primary: None,
            secondary: None,
        }
    }

    /// A primary option only.
    #[must_use]
    pub const fn primary(option: usize) -> Self {
        Self {
            primary: Some(option),
            secondary: None,
        }
    }

    /// A primary and a secondary option.
    #[must_use]
    pub const fn pair(primary: usize, secondary: usize) -> Self {
        Self {
            primary: Some(primary),
            secondary: Some(secondary),
        }
    }
}

/// Where a resolved multiplier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplierSource {
    /// The n-th (1-based) range declared for the lookup key
    Range(RangeKey, usize),

    /// A primary/secondary combination
    Combination(usize, usize),

    /// The flat multiplier of the primary option
    Flat(usize),

    /// The base multiplier
    Base,
}

/// A multiplier together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMultiplier {
    /// The multiplier value
    pub value: Decimal,

    /// The rule that produced it
    pub source: MultiplierSource,
}

/// Resolve the multiplier for an input value and dropdown selection.
///
/// Ranges for the lookup key are scanned in declaration order and the first range
/// containing `input` wins. Without a matching range the combination multiplier, then the
/// flat multiplier of the primary option, then the base multiplier apply.
///
/// A selected pair without a `combination-{n}-{m}` entry is not pinned to `1`: it falls
/// through to the flat and base multipliers like a single selection does.
pub fn resolve(config: &CalculatorConfig, input: Decimal, selection: Selection) -> Decimal {
    resolve_with_source(config, input, selection).value
}

/// Like [`resolve`], also reporting which rule produced the multiplier.
pub fn resolve_with_source(
    config: &CalculatorConfig,
    input: Decimal,
    selection: Selection,
) -> ResolvedMultiplier {
    let resolved = range_multiplier(config, input, selection)
        .or_else(|| combination_multiplier(config, selection))
        .or_else(|| flat_multiplier(config, selection))
        .unwrap_or(ResolvedMultiplier {
            value: config.base_multiplier(),
            source: MultiplierSource::Base,
        });

    trace!(%input, multiplier = %resolved.value, source = ?resolved.source, "resolved multiplier");

    resolved
}

fn lookup_key(config: &CalculatorConfig, selection: Selection) -> Option<RangeKey> {
    if config.has_options() {
        selection.primary.map(RangeKey::Option)
    } else {
        Some(RangeKey::Global)
    }
}

fn range_multiplier(
    config: &CalculatorConfig,
    input: Decimal,
    selection: Selection,
) -> Option<ResolvedMultiplier> {
    let key = lookup_key(config, selection)?;

    config
        .ranges(key)?
        .iter()
        .enumerate()
        .find(|(_, range)| range.contains(input))
        .map(|(idx, range)| ResolvedMultiplier {
            value: range.multiplier,
            source: MultiplierSource::Range(key, idx + 1),
        })
}

fn combination_multiplier(
    config: &CalculatorConfig,
    selection: Selection,
) -> Option<ResolvedMultiplier> {
    let (primary, secondary) = selection.primary.zip(selection.secondary)?;

    config
        .combination_multiplier(primary, secondary)
        .map(|value| ResolvedMultiplier {
            value,
            source: MultiplierSource::Combination(primary, secondary),
        })
}

fn flat_multiplier(config: &CalculatorConfig, selection: Selection) -> Option<ResolvedMultiplier> {
    let primary = selection.primary?;

    config
        .flat_multiplier(primary)
        .map(|value| ResolvedMultiplier {
            value,
            source: MultiplierSource::Flat(primary),
        })
}
