//! Calculation Results

use std::{fmt, io};

use rust_decimal::{Decimal, RoundingStrategy};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    calculator::CalculationError,
    config::CalculatorConfig,
    packages::{AllocationMode, PackageCount, allocate},
};

/// Decimal places kept for coverage-mode totals.
const COVERAGE_DECIMAL_PLACES: u32 = 2;

/// Errors rendering a result.
#[derive(Debug, Error)]
pub enum RenderError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Recommended packages behind a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    mode: AllocationMode,
    packages: SmallVec<[PackageCount; 4]>,
    total_supplied: Decimal,
}

impl Breakdown {
    /// Policy that produced the breakdown.
    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    /// Chosen packages, descending by size.
    pub fn packages(&self) -> &[PackageCount] {
        &self.packages
    }

    /// Quantity supplied by the chosen packages.
    pub fn total_supplied(&self) -> Decimal {
        self.total_supplied
    }
}

/// Outcome of one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationResult {
    total_quantity: Decimal,
    breakdown: Option<Breakdown>,
    unit: String,
    label: String,
}

impl CalculationResult {
    /// The recommended quantity.
    pub fn total_quantity(&self) -> Decimal {
        self.total_quantity
    }

    /// Package breakdown, present when the product is sold in packages.
    pub fn breakdown(&self) -> Option<&Breakdown> {
        self.breakdown.as_ref()
    }

    /// Result unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The labelled text shown to the shopper, e.g. `Výsledek: 12 ks (3 × 4 ks)`.
    pub fn display_text(&self) -> String {
        if self.label.is_empty() {
            self.to_string()
        } else {
            format!("{} {self}", self.label)
        }
    }

    /// Render the result as a table of packages followed by the labelled total.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), RenderError> {
        if let Some(breakdown) = self.breakdown.as_ref().filter(|b| !b.packages.is_empty()) {
            let mut builder = Builder::default();

            builder.push_record(["Package", "Count", "Quantity"]);

            for package in &breakdown.packages {
                let supplied = package.supplied().unwrap_or(Decimal::MAX);

                builder.push_record([
                    format!("{} {}", quantity(package.size), self.unit),
                    quantity(package.count).to_string(),
                    format!("{} {}", quantity(supplied), self.unit),
                ]);
            }

            let mut table = builder.build();

            table.with(Style::modern_rounded());
            table.modify(Rows::first(), Color::BOLD);
            table.modify(Columns::new(1..3), Alignment::right());

            writeln!(out, "{table}").map_err(|_err| RenderError::IO)?;
        }

        writeln!(out, "{}", self.display_text()).map_err(|_err| RenderError::IO)
    }
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quantity(self.total_quantity), self.unit)?;

        let Some(breakdown) = &self.breakdown else {
            return Ok(());
        };

        for (idx, package) in breakdown.packages.iter().enumerate() {
            let sep = if idx == 0 { " (" } else { " + " };

            write!(
                f,
                "{sep}{} × {} {}",
                quantity(package.count),
                quantity(package.size),
                self.unit
            )?;
        }

        if breakdown.packages.is_empty() {
            Ok(())
        } else {
            f.write_str(")")
        }
    }
}

/// Turn a resolved multiplier and an input value into a result.
///
/// With packages configured the raw quantity is allocated: coverage mode reports the raw
/// quantity rounded to two places, divisor mode reports the quantity the packages supply.
/// Without packages the raw quantity is rounded up, then up to the rounding step.
///
/// # Errors
///
/// Returns a [`CalculationError`] if the arithmetic overflows.
pub fn format_result(
    multiplier: Decimal,
    input: Decimal,
    config: &CalculatorConfig,
) -> Result<CalculationResult, CalculationError> {
    let raw = input
        .checked_mul(multiplier)
        .ok_or(CalculationError::Overflow(input))?;

    let (total_quantity, breakdown) = if config.packages().is_empty() {
        (round_to_step(raw, config.rounding_step())?, None)
    } else {
        let mode = AllocationMode::for_packages(config.packages());
        let allocation = allocate(raw, config.packages(), mode)?;
        let total_supplied = allocation.total_supplied();

        let total = match mode {
            AllocationMode::Coverage => raw.round_dp_with_strategy(
                COVERAGE_DECIMAL_PLACES,
                RoundingStrategy::MidpointAwayFromZero,
            ),
            AllocationMode::Divisor => total_supplied,
        };

        let breakdown = Breakdown {
            mode,
            packages: allocation.into_counts(),
            total_supplied,
        };

        (total, Some(breakdown))
    };

    Ok(CalculationResult {
        total_quantity,
        breakdown,
        unit: config.unit().to_string(),
        label: config.labels().result.clone(),
    })
}

/// Round up to a whole number, then up to a multiple of `step` when `step > 1`.
fn round_to_step(raw: Decimal, step: Decimal) -> Result<Decimal, CalculationError> {
    let whole = raw.ceil();

    if step <= Decimal::ONE {
        return Ok(whole);
    }

    whole
        .checked_div(step)
        .map(|steps| steps.ceil())
        .and_then(|steps| steps.checked_mul(step))
        .ok_or(CalculationError::Overflow(raw))
}

/// Quantities are shown without trailing zeros.
fn quantity(value: Decimal) -> Decimal {
    value.normalize()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::config::PackageSize;

    use super::*;

    fn plain(step: i64) -> CalculatorConfig {
        CalculatorConfig::default().with_rounding_step(Decimal::from(step))
    }

    #[test]
    fn plain_result_rounds_up_to_a_whole_number() -> TestResult {
        let result = format_result(Decimal::new(125, 3), Decimal::from(10), &plain(1))?;

        assert_eq!(result.total_quantity(), Decimal::TWO);
        assert!(result.breakdown().is_none());
        assert_eq!(result.to_string(), "2 ks");

        Ok(())
    }

    #[test]
    fn plain_result_rounds_up_to_the_step() -> TestResult {
        let twelve = format_result(Decimal::ONE, Decimal::from(12), &plain(5))?;
        let ten = format_result(Decimal::ONE, Decimal::TEN, &plain(5))?;
        let fractional = format_result(Decimal::ONE, Decimal::new(101, 1), &plain(5))?;

        assert_eq!(twelve.total_quantity(), Decimal::from(15));
        assert_eq!(ten.total_quantity(), Decimal::TEN);
        assert_eq!(fractional.total_quantity(), Decimal::from(15));

        Ok(())
    }

    #[test]
    fn divisor_packages_report_the_supplied_quantity() -> TestResult {
        let config = CalculatorConfig::default().with_packages([
            PackageSize::new(Decimal::TEN),
            PackageSize::new(Decimal::from(4)),
        ]);

        let result = format_result(Decimal::ONE, Decimal::from(9), &config)?;

        assert_eq!(result.total_quantity(), Decimal::from(12));
        assert_eq!(result.to_string(), "12 ks (3 × 4 ks)");

        let breakdown = result.breakdown().ok_or("expected a breakdown")?;
        assert_eq!(breakdown.mode(), AllocationMode::Divisor);
        assert_eq!(breakdown.total_supplied(), Decimal::from(12));

        Ok(())
    }

    #[test]
    fn coverage_packages_report_the_raw_quantity_to_two_places() -> TestResult {
        let config = CalculatorConfig::default()
            .with_unit("l")
            .with_packages([
                PackageSize::with_coverage(Decimal::TEN, Decimal::from(100)),
                PackageSize::with_coverage(Decimal::from(4), Decimal::from(40)),
            ]);

        let input = Decimal::new(1234, 1) / Decimal::from(3);
        let result = format_result(Decimal::new(1, 1), input, &config)?;

        assert_eq!(result.total_quantity(), Decimal::new(411, 2));
        assert_eq!(result.to_string(), "4.11 l (1 × 10 l)");

        let breakdown = result.breakdown().ok_or("expected a breakdown")?;
        assert_eq!(breakdown.mode(), AllocationMode::Coverage);
        assert_eq!(breakdown.total_supplied(), Decimal::TEN);

        Ok(())
    }

    #[test]
    fn zero_input_with_packages_has_an_empty_breakdown() -> TestResult {
        let config =
            CalculatorConfig::default().with_packages([PackageSize::new(Decimal::from(4))]);

        let result = format_result(Decimal::ONE, Decimal::ZERO, &config)?;

        assert_eq!(result.total_quantity(), Decimal::ZERO);
        assert_eq!(result.to_string(), "0 ks");

        Ok(())
    }

    #[test]
    fn negative_plain_result_rounds_towards_zero() -> TestResult {
        let result = format_result(Decimal::ONE, Decimal::new(-25, 1), &plain(1))?;

        assert_eq!(result.total_quantity(), Decimal::from(-2));

        Ok(())
    }

    #[test]
    fn overflow_is_reported() {
        let result = format_result(Decimal::MAX, Decimal::TWO, &plain(1));

        assert!(matches!(result, Err(CalculationError::Overflow(_))));
    }

    #[test]
    fn display_text_uses_the_configured_label() -> TestResult {
        let result = format_result(Decimal::ONE, Decimal::from(3), &plain(1))?;

        assert_eq!(result.display_text(), "Výsledek: 3 ks");

        Ok(())
    }

    #[test]
    fn write_to_renders_a_package_table() -> TestResult {
        let config = CalculatorConfig::default().with_packages([
            PackageSize::new(Decimal::TEN),
            PackageSize::new(Decimal::from(4)),
        ]);
        let result = format_result(Decimal::ONE, Decimal::from(23), &config)?;

        let mut out = Vec::new();
        result.write_to(&mut out)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("Package"), "missing header in {text}");
        assert!(text.contains("10 ks"), "missing package row in {text}");
        assert!(text.ends_with("Výsledek: 24 ks (2 × 10 ks + 1 × 4 ks)\n"));

        Ok(())
    }

    #[test]
    fn write_to_plain_result_is_a_single_line() -> TestResult {
        let result = format_result(Decimal::ONE, Decimal::from(3), &plain(1))?;

        let mut out = Vec::new();
        result.write_to(&mut out)?;

        assert_eq!(String::from_utf8(out)?, "Výsledek: 3 ks\n");

        Ok(())
    }
}
