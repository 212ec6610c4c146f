//! Calculator Configuration
//!
//! An immutable snapshot of everything a product page declares about its calculator.
//! Built once (usually by [`crate::extract::extract_config`]) and then shared by every
//! calculation.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Default unit for both the input and the result.
pub const DEFAULT_UNIT: &str = "ks";

/// Default label shown in front of a result.
pub const DEFAULT_RESULT_LABEL: &str = "Výsledek:";

/// Default message for a non-numeric entry.
pub const DEFAULT_INVALID_MESSAGE: &str = "Prosím zadejte platnou hodnotu";

/// Default label of the primary dropdown.
pub const DEFAULT_DROPDOWN_LABEL: &str = "Vyberte možnost 1:";

/// Default label of the secondary dropdown.
pub const DEFAULT_SECONDARY_DROPDOWN_LABEL: &str = "Vyberte možnost 2:";

/// Default label of the quantity input.
pub const DEFAULT_INPUT_LABEL: &str = "Množství:";

/// One entry of a dropdown. Indexes are 1-based and dense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    /// 1-based position in the dropdown
    pub index: usize,

    /// Text shown to the shopper
    pub label: String,
}

impl DropdownOption {
    /// Create a new dropdown option.
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

/// Which set of ranges a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKey {
    /// Ranges declared for a product without a dropdown
    Global,

    /// Ranges declared for one dropdown option
    Option(usize),
}

/// A closed interval of input values mapped to a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRange {
    /// Inclusive lower bound
    pub min: Decimal,

    /// Inclusive upper bound; `None` is unbounded
    pub max: Option<Decimal>,

    /// Multiplier applied when the input falls inside the range
    pub multiplier: Decimal,
}

impl QuantityRange {
    /// Create a bounded range.
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal, multiplier: Decimal) -> Self {
        Self {
            min,
            max: Some(max),
            multiplier,
        }
    }

    /// Create a range with no upper bound.
    #[must_use]
    pub const fn unbounded(min: Decimal, multiplier: Decimal) -> Self {
        Self {
            min,
            max: None,
            multiplier,
        }
    }

    /// Whether `value` lies inside the range, both ends inclusive.
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }
}

/// A package the product is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageSize {
    /// Quantity in one package, in the result unit
    pub size: Decimal,

    /// Declared yield of one package, if any
    pub coverage: Option<Decimal>,
}

impl PackageSize {
    /// A package without declared coverage.
    #[must_use]
    pub const fn new(size: Decimal) -> Self {
        Self {
            size,
            coverage: None,
        }
    }

    /// A package with declared coverage.
    #[must_use]
    pub const fn with_coverage(size: Decimal, coverage: Decimal) -> Self {
        Self {
            size,
            coverage: Some(coverage),
        }
    }
}

/// Cosmetic text used by whatever renders the calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Free-form description shown above the calculator
    pub description: String,

    /// Label of the primary dropdown
    pub dropdown: String,

    /// Label of the secondary dropdown
    pub secondary_dropdown: String,

    /// Label of the quantity input
    pub input: String,

    /// Text placed before a result
    pub result: String,

    /// Message shown for a non-numeric entry
    pub invalid_value: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            description: String::new(),
            dropdown: DEFAULT_DROPDOWN_LABEL.to_string(),
            secondary_dropdown: DEFAULT_SECONDARY_DROPDOWN_LABEL.to_string(),
            input: DEFAULT_INPUT_LABEL.to_string(),
            result: DEFAULT_RESULT_LABEL.to_string(),
            invalid_value: DEFAULT_INVALID_MESSAGE.to_string(),
        }
    }
}

/// Calculator Configuration
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    base_multiplier: Option<Decimal>,
    options: Vec<DropdownOption>,
    secondary_options: Vec<DropdownOption>,
    flat_multipliers: FxHashMap<usize, Decimal>,
    combination_multipliers: FxHashMap<(usize, usize), Decimal>,
    ranges: FxHashMap<RangeKey, SmallVec<[QuantityRange; 4]>>,
    packages: SmallVec<[PackageSize; 4]>,
    unit: String,
    provided_unit: String,
    rounding_step: Decimal,
    labels: Labels,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            base_multiplier: None,
            options: Vec::new(),
            secondary_options: Vec::new(),
            flat_multipliers: FxHashMap::default(),
            combination_multipliers: FxHashMap::default(),
            ranges: FxHashMap::default(),
            packages: SmallVec::new(),
            unit: DEFAULT_UNIT.to_string(),
            provided_unit: DEFAULT_UNIT.to_string(),
            rounding_step: Decimal::ONE,
            labels: Labels::default(),
        }
    }
}

impl CalculatorConfig {
    /// Declare the base multiplier.
    #[must_use]
    pub fn with_base_multiplier(mut self, multiplier: Decimal) -> Self {
        self.base_multiplier = Some(multiplier);
        self
    }

    /// Set the primary dropdown options.
    #[must_use]
    pub fn with_options(mut self, options: impl Into<Vec<DropdownOption>>) -> Self {
        self.options = options.into();
        self
    }

    /// Set the secondary dropdown options.
    #[must_use]
    pub fn with_secondary_options(mut self, options: impl Into<Vec<DropdownOption>>) -> Self {
        self.secondary_options = options.into();
        self
    }

    /// Set the flat multiplier of a primary option.
    #[must_use]
    pub fn with_flat_multiplier(mut self, option: usize, multiplier: Decimal) -> Self {
        self.flat_multipliers.insert(option, multiplier);
        self
    }

    /// Set the multiplier of a primary/secondary option pair.
    #[must_use]
    pub fn with_combination_multiplier(
        mut self,
        primary: usize,
        secondary: usize,
        multiplier: Decimal,
    ) -> Self {
        self.combination_multipliers
            .insert((primary, secondary), multiplier);
        self
    }

    /// Set the ranges for a key, in declaration order. Empty lists are ignored.
    #[must_use]
    pub fn with_ranges(
        mut self,
        key: RangeKey,
        ranges: impl IntoIterator<Item = QuantityRange>,
    ) -> Self {
        let ranges: SmallVec<[QuantityRange; 4]> = ranges.into_iter().collect();

        if ranges.is_empty() {
            self.ranges.remove(&key);
        } else {
            self.ranges.insert(key, ranges);
        }

        self
    }

    /// Set the package sizes; they are kept sorted descending by size.
    #[must_use]
    pub fn with_packages(mut self, packages: impl IntoIterator<Item = PackageSize>) -> Self {
        self.packages = packages.into_iter().collect();
        self.packages.sort_by(|a, b| b.size.cmp(&a.size));
        self
    }

    /// Set the result unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the input unit.
    #[must_use]
    pub fn with_provided_unit(mut self, unit: impl Into<String>) -> Self {
        self.provided_unit = unit.into();
        self
    }

    /// Set the rounding step; values below `1` are raised to `1`.
    #[must_use]
    pub fn with_rounding_step(mut self, step: Decimal) -> Self {
        self.rounding_step = step.max(Decimal::ONE);
        self
    }

    /// Replace the cosmetic labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// The base multiplier, `1` unless one was declared.
    pub fn base_multiplier(&self) -> Decimal {
        self.base_multiplier.unwrap_or(Decimal::ONE)
    }

    /// Whether a base multiplier was explicitly declared.
    pub fn declares_base_multiplier(&self) -> bool {
        self.base_multiplier.is_some()
    }

    /// Primary dropdown options, in index order.
    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    /// Secondary dropdown options, in index order.
    pub fn secondary_options(&self) -> &[DropdownOption] {
        &self.secondary_options
    }

    /// Whether the calculator has a primary dropdown.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Flat multiplier of a primary option.
    pub fn flat_multiplier(&self, option: usize) -> Option<Decimal> {
        self.flat_multipliers.get(&option).copied()
    }

    /// Multiplier of a primary/secondary option pair.
    pub fn combination_multiplier(&self, primary: usize, secondary: usize) -> Option<Decimal> {
        self.combination_multipliers
            .get(&(primary, secondary))
            .copied()
    }

    /// Ranges for a key, in declaration order.
    pub fn ranges(&self, key: RangeKey) -> Option<&[QuantityRange]> {
        self.ranges.get(&key).map(SmallVec::as_slice)
    }

    /// Whether any ranges are configured at all.
    pub fn has_ranges(&self) -> bool {
        !self.ranges.is_empty()
    }

    /// Package sizes, descending by size.
    pub fn packages(&self) -> &[PackageSize] {
        &self.packages
    }

    /// True when there are packages and every one of them declares coverage.
    pub fn has_coverage(&self) -> bool {
        !self.packages.is_empty() && self.packages.iter().all(|p| p.coverage.is_some())
    }

    /// Result unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Input unit.
    pub fn provided_unit(&self) -> &str {
        &self.provided_unit
    }

    /// Rounding step for results without packages.
    pub fn rounding_step(&self) -> Decimal {
        self.rounding_step
    }

    /// Cosmetic labels.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Whether the page declares enough for a calculator to be shown at all.
    pub fn is_applicable(&self) -> bool {
        self.has_options()
            || self.declares_base_multiplier()
            || self.has_ranges()
            || !self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_an_unconfigured_page() {
        let config = CalculatorConfig::default();

        assert_eq!(config.base_multiplier(), Decimal::ONE);
        assert!(!config.declares_base_multiplier());
        assert_eq!(config.unit(), DEFAULT_UNIT);
        assert_eq!(config.provided_unit(), DEFAULT_UNIT);
        assert_eq!(config.rounding_step(), Decimal::ONE);
        assert!(!config.is_applicable());
    }

    #[test]
    fn packages_are_sorted_descending() {
        let config = CalculatorConfig::default().with_packages([
            PackageSize::new(Decimal::from(4)),
            PackageSize::new(Decimal::from(25)),
            PackageSize::new(Decimal::TEN),
        ]);

        let sizes: Vec<Decimal> = config.packages().iter().map(|p| p.size).collect();

        assert_eq!(
            sizes,
            vec![Decimal::from(25), Decimal::TEN, Decimal::from(4)]
        );
    }

    #[test]
    fn coverage_requires_every_package_to_declare_it() {
        let mixed = CalculatorConfig::default().with_packages([
            PackageSize::with_coverage(Decimal::TEN, Decimal::TEN),
            PackageSize::new(Decimal::from(4)),
        ]);
        let full = CalculatorConfig::default().with_packages([
            PackageSize::with_coverage(Decimal::TEN, Decimal::TEN),
            PackageSize::with_coverage(Decimal::from(4), Decimal::from(4)),
        ]);

        assert!(!mixed.has_coverage());
        assert!(full.has_coverage());
        assert!(!CalculatorConfig::default().has_coverage());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = QuantityRange::new(Decimal::ONE, Decimal::TEN, Decimal::TWO);

        assert!(range.contains(Decimal::ONE));
        assert!(range.contains(Decimal::TEN));
        assert!(!range.contains(Decimal::from(11)));
        assert!(!range.contains(Decimal::ZERO));
    }

    #[test]
    fn unbounded_range_has_no_upper_limit() {
        let range = QuantityRange::unbounded(Decimal::ONE_HUNDRED, Decimal::TWO);

        assert!(range.contains(Decimal::MAX));
        assert!(!range.contains(Decimal::from(99)));
    }

    #[test]
    fn empty_range_list_is_not_stored() {
        let config = CalculatorConfig::default().with_ranges(RangeKey::Global, Vec::new());

        assert!(!config.has_ranges());
        assert!(config.ranges(RangeKey::Global).is_none());
    }

    #[test]
    fn rounding_step_is_clamped_to_one() {
        let config = CalculatorConfig::default().with_rounding_step(Decimal::ZERO);

        assert_eq!(config.rounding_step(), Decimal::ONE);
    }

    #[test]
    fn any_declared_source_makes_the_calculator_applicable() {
        let multiplier = CalculatorConfig::default().with_base_multiplier(Decimal::ONE);
        let options = CalculatorConfig::default().with_options([DropdownOption::new(1, "A")]);
        let packages =
            CalculatorConfig::default().with_packages([PackageSize::new(Decimal::ONE)]);
        let ranges = CalculatorConfig::default().with_ranges(
            RangeKey::Global,
            [QuantityRange::unbounded(Decimal::ZERO, Decimal::TWO)],
        );

        assert!(multiplier.is_applicable());
        assert!(options.is_applicable());
        assert!(packages.is_applicable());
        assert!(ranges.is_applicable());
    }
}
