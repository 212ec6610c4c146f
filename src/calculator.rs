//! Calculator
//!
//! Ties configuration, multiplier resolution, package allocation and result formatting
//! together. A [`Calculator`] is built once per page and answers any number of
//! independent requests.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{Span, debug};

use crate::{
    config::CalculatorConfig,
    extract::extract_config,
    multiplier::{Selection, resolve_with_source},
    numbers::{InputError, parse_input},
    packages::AllocationError,
    result::{CalculationResult, format_result},
    source::ConfigSource,
};

/// Errors building a calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    /// The configuration declares no dropdown, multiplier, ranges or packages.
    #[error("configuration declares no dropdown, multiplier, ranges or packages")]
    NotApplicable,
}

/// Errors from a single calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// The entered value is not a number.
    #[error("invalid value: {0:?}")]
    InvalidInput(String),

    /// The entered value is a number too large to calculate with.
    #[error("value out of range: {0:?}")]
    InputOutOfRange(String),

    /// Arithmetic overflowed for the given input.
    #[error("calculation overflowed for input {0}")]
    Overflow(Decimal),

    /// Package allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// One calculation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationRequest {
    /// Value entered by the shopper, in the input unit
    pub input_value: Decimal,

    /// Dropdown selection in effect
    pub selection: Selection,
}

impl CalculationRequest {
    /// Create a new request.
    #[must_use]
    pub const fn new(input_value: Decimal, selection: Selection) -> Self {
        Self {
            input_value,
            selection,
        }
    }
}

/// Calculator
#[derive(Debug, Clone)]
pub struct Calculator {
    config: CalculatorConfig,
}

impl Calculator {
    /// Create a calculator for a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::NotApplicable`] when the configuration declares nothing
    /// to calculate with.
    pub fn new(config: CalculatorConfig) -> Result<Self, CalculatorError> {
        if !config.is_applicable() {
            return Err(CalculatorError::NotApplicable);
        }

        Ok(Self { config })
    }

    /// Extract a configuration from `source` and create a calculator for it.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::NotApplicable`] when the source declares nothing to
    /// calculate with.
    pub fn from_source<S: ConfigSource + ?Sized>(source: &S) -> Result<Self, CalculatorError> {
        Self::new(extract_config(source))
    }

    /// The configuration in use.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Run one calculation.
    ///
    /// # Errors
    ///
    /// Returns a [`CalculationError`] if the arithmetic overflows.
    #[tracing::instrument(
        name = "calculator.calculate",
        skip(self),
        fields(
            input = %request.input_value,
            multiplier = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    pub fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, CalculationError> {
        let span = Span::current();
        let multiplier =
            resolve_with_source(&self.config, request.input_value, request.selection);

        span.record("multiplier", tracing::field::display(multiplier.value));
        debug!(source = ?multiplier.source, "multiplier resolved");

        let result = format_result(multiplier.value, request.input_value, &self.config)?;

        span.record("total", tracing::field::display(result.total_quantity()));

        Ok(result)
    }

    /// Parse the shopper's entry and run one calculation.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidInput`] when `input` is not a number and
    /// [`CalculationError::InputOutOfRange`] when it is too large; nothing is calculated in
    /// either case.
    pub fn calculate_input(
        &self,
        input: &str,
        selection: Selection,
    ) -> Result<CalculationResult, CalculationError> {
        let input_value = parse_input(input).map_err(|err| match err {
            InputError::NotANumber => CalculationError::InvalidInput(input.to_string()),
            InputError::OutOfRange => CalculationError::InputOutOfRange(input.to_string()),
        })?;

        self.calculate(&CalculationRequest::new(input_value, selection))
    }
}
