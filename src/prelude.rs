//! Minicalc prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    calculator::{CalculationError, CalculationRequest, Calculator, CalculatorError},
    config::{CalculatorConfig, DropdownOption, Labels, PackageSize, QuantityRange, RangeKey},
    extract::extract_config,
    multiplier::{MultiplierSource, ResolvedMultiplier, Selection, resolve, resolve_with_source},
    numbers::InputError,
    packages::{Allocation, AllocationError, AllocationMode, PackageCount, allocate},
    result::{Breakdown, CalculationResult, RenderError, format_result},
    source::{ConfigSource, KeyValueSource, SourceError},
};
