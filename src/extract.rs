//! Configuration Extraction
//!
//! Turns a [`ConfigSource`] into a [`CalculatorConfig`]. Indexed entries are discovered
//! from `1` upwards and discovery stops at the first missing index, so `option-1`,
//! `option-2`, `option-4` yields two options.
//!
//! Extraction is a pure read and never fails: malformed numbers fall back to the
//! defaults in [`crate::numbers`].

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    config::{CalculatorConfig, DropdownOption, Labels, PackageSize, QuantityRange, RangeKey},
    numbers::{
        parse_leading_decimal, parse_multiplier, parse_range_max, parse_range_min,
        parse_rounding_step,
    },
    source::ConfigSource,
};

/// Build a calculator configuration from a key-value source.
pub fn extract_config<S: ConfigSource + ?Sized>(source: &S) -> CalculatorConfig {
    let options = dropdown_options(source, "option");
    let secondary_options = dropdown_options(source, "option2");

    let mut config = CalculatorConfig::default()
        .with_packages(packages(source))
        .with_rounding_step(parse_rounding_step(source.value("rounding")))
        .with_labels(labels(source));

    if let Some(unit) = source.value("unit") {
        config = config.with_unit(unit);
    }

    if let Some(unit) = source.value("provided-unit") {
        config = config.with_provided_unit(unit);
    }

    if let Some(multiplier) = source.value("multiplier") {
        config = config.with_base_multiplier(parse_multiplier(Some(multiplier)));
    }

    if options.is_empty() {
        config = config.with_ranges(
            RangeKey::Global,
            ranges(source, |n| {
                (
                    format!("range-{n}-min"),
                    format!("range-{n}-max"),
                    format!("multiplier-{n}"),
                )
            }),
        );
    }

    for option in &options {
        let o = option.index;

        if let Some(multiplier) = source.value(&format!("multiplier-{o}")) {
            config = config.with_flat_multiplier(o, parse_multiplier(Some(multiplier)));
        }

        config = config.with_ranges(
            RangeKey::Option(o),
            ranges(source, |n| {
                (
                    format!("range-{o}-{n}-min"),
                    format!("range-{o}-{n}-max"),
                    format!("multiplier-{o}-{n}"),
                )
            }),
        );

        for secondary in &secondary_options {
            let s = secondary.index;

            if let Some(multiplier) = source.value(&format!("combination-{o}-{s}")) {
                config = config.with_combination_multiplier(
                    o,
                    s,
                    parse_multiplier(Some(multiplier)),
                );
            }
        }
    }

    let config = config
        .with_options(options)
        .with_secondary_options(secondary_options);

    debug!(
        options = config.options().len(),
        secondary_options = config.secondary_options().len(),
        packages = config.packages().len(),
        coverage = config.has_coverage(),
        ranges = config.has_ranges(),
        unit = config.unit(),
        "extracted calculator configuration"
    );

    config
}

/// Walk `1, 2, 3, ...` until `f` returns `None`.
fn discover<T>(f: impl FnMut(usize) -> Option<T>) -> impl Iterator<Item = T> {
    (1..).map_while(f)
}

fn dropdown_options<S: ConfigSource + ?Sized>(source: &S, prefix: &str) -> Vec<DropdownOption> {
    discover(|n| {
        source
            .value(&format!("{prefix}-{n}"))
            .map(|label| DropdownOption::new(n, label))
    })
    .collect()
}

fn ranges<S: ConfigSource + ?Sized>(
    source: &S,
    keys: impl Fn(usize) -> (String, String, String),
) -> SmallVec<[QuantityRange; 4]> {
    discover(|n| {
        let (min_key, max_key, multiplier_key) = keys(n);
        let min = source.value(&min_key);
        let max = source.value(&max_key);

        if min.is_none() && max.is_none() {
            return None;
        }

        Some(QuantityRange {
            min: parse_range_min(min),
            max: parse_range_max(max),
            multiplier: parse_multiplier(source.value(&multiplier_key)),
        })
    })
    .collect()
}

fn packages<S: ConfigSource + ?Sized>(source: &S) -> SmallVec<[PackageSize; 4]> {
    discover(|n| {
        source
            .value(&format!("package-{n}"))
            .map(|size| (n, size))
    })
    .filter_map(|(n, size)| {
        let Some(size) = parse_leading_decimal(size).filter(|size| *size > Decimal::ZERO) else {
            warn!(index = n, size, "skipping package without a positive size");
            return None;
        };

        let coverage = source
            .value(&format!("package-{n}-coverage"))
            .and_then(parse_leading_decimal);

        Some(PackageSize { size, coverage })
    })
    .collect()
}

fn labels<S: ConfigSource + ?Sized>(source: &S) -> Labels {
    let defaults = Labels::default();
    let text = |key: &str, default: String| source.value(key).map_or(default, str::to_string);

    Labels {
        description: text("description", defaults.description),
        dropdown: text("dropdown-label", defaults.dropdown),
        secondary_dropdown: text("dropdown2-label", defaults.secondary_dropdown),
        input: text("input-label", defaults.input),
        result: text("result-label", defaults.result),
        invalid_value: text("invalid-message", defaults.invalid_value),
    }
}
