//! Package Allocation
//!
//! Given a target quantity and the package sizes a product is sold in, recommend how many
//! of each package to buy. Two policies exist:
//!
//! - [`AllocationMode::Coverage`]: each package must cover a continuous quantity (paint,
//!   plaster). While the remainder exceeds the largest package, take the largest; then
//!   close out with the smallest package that covers what is left.
//! - [`AllocationMode::Divisor`]: countable units. Take `floor(remaining / size)` of every
//!   size from the largest down, then top up any remainder with the smallest package that
//!   covers it.
//!
//! Neither policy promises the fewest packages. Both never under-supply.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::config::PackageSize;

/// Errors from package allocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Allocation was requested without any positive package size.
    #[error("no package sizes configured; nothing to allocate")]
    NoPackages,

    /// The supplied total does not fit the numeric range.
    #[error("allocation overflowed for target {0}")]
    Overflow(Decimal),
}

/// Allocation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    /// "At least" allocation for packages declaring coverage
    Coverage,

    /// Greedy division with a remainder top-up
    Divisor,
}

impl AllocationMode {
    /// Coverage mode when there are packages and all of them declare coverage.
    pub fn for_packages(packages: &[PackageSize]) -> Self {
        if !packages.is_empty() && packages.iter().all(|p| p.coverage.is_some()) {
            Self::Coverage
        } else {
            Self::Divisor
        }
    }
}

/// How many of one package size to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageCount {
    /// Package size
    pub size: Decimal,

    /// Declared coverage of the package, if any
    pub coverage: Option<Decimal>,

    /// Number of packages, always a whole number
    pub count: Decimal,
}

impl PackageCount {
    /// Quantity supplied by these packages.
    pub fn supplied(&self) -> Option<Decimal> {
        self.size.checked_mul(self.count)
    }
}

/// Result of an allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    counts: SmallVec<[PackageCount; 4]>,
    total_supplied: Decimal,
}

impl Allocation {
    /// Chosen packages, descending by size. Sizes with a zero count are omitted.
    pub fn counts(&self) -> &[PackageCount] {
        &self.counts
    }

    /// Count chosen for a size, `0` when the size was not used.
    pub fn count_of(&self, size: Decimal) -> Decimal {
        self.counts
            .iter()
            .find(|c| c.size == size)
            .map_or(Decimal::ZERO, |c| c.count)
    }

    /// Sum of `size × count` over all chosen packages.
    pub fn total_supplied(&self) -> Decimal {
        self.total_supplied
    }

    /// Total number of packages.
    pub fn package_count(&self) -> Decimal {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Whether nothing was allocated.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Consume the allocation, returning the chosen packages.
    pub fn into_counts(self) -> SmallVec<[PackageCount; 4]> {
        self.counts
    }
}

/// Allocate packages for `target`.
///
/// Packages may be given in any order; duplicate sizes are merged and sizes that are not
/// positive are ignored. A target of zero or less allocates nothing.
///
/// # Errors
///
/// - [`AllocationError::NoPackages`]: `packages` is empty.
/// - [`AllocationError::Overflow`]: a count or the supplied total cannot be represented.
pub fn allocate(
    target: Decimal,
    packages: &[PackageSize],
    mode: AllocationMode,
) -> Result<Allocation, AllocationError> {
    let mut tally = Tally::new(packages, target)?;

    if target > Decimal::ZERO {
        match mode {
            AllocationMode::Coverage => allocate_coverage(&mut tally, target)?,
            AllocationMode::Divisor => allocate_divisor(&mut tally, target)?,
        }
    }

    let allocation = tally.finish()?;

    debug!(
        %target,
        ?mode,
        packages = %allocation.package_count(),
        total_supplied = %allocation.total_supplied,
        "allocated packages"
    );

    Ok(allocation)
}

fn allocate_coverage(tally: &mut Tally, target: Decimal) -> Result<(), AllocationError> {
    let overflow = || AllocationError::Overflow(target);
    let largest = tally.largest();
    let mut remaining = target;

    // Taking the largest package until the remainder fits is done in one step.
    if remaining > largest {
        let units = remaining
            .checked_sub(largest)
            .and_then(|excess| excess.checked_div(largest))
            .map(|units| units.ceil())
            .ok_or_else(overflow)?;

        tally.add(0, units)?;
        remaining = units
            .checked_mul(largest)
            .and_then(|taken| remaining.checked_sub(taken))
            .ok_or_else(overflow)?;
    }

    // The quotient above is rounded to 28 digits; settle any precision tail one package
    // at a time.
    while remaining > largest {
        tally.add(0, Decimal::ONE)?;
        remaining = remaining.checked_sub(largest).ok_or_else(overflow)?;
    }

    if remaining > Decimal::ZERO {
        let idx = tally.smallest_covering(remaining).unwrap_or(0);
        tally.add(idx, Decimal::ONE)?;
    }

    Ok(())
}

fn allocate_divisor(tally: &mut Tally, target: Decimal) -> Result<(), AllocationError> {
    let overflow = || AllocationError::Overflow(target);
    let mut remaining = target;

    for idx in 0..tally.len() {
        let size = tally.size(idx);
        let units = remaining
            .checked_div(size)
            .map(|units| units.floor())
            .ok_or_else(overflow)?;

        if units > Decimal::ZERO {
            tally.add(idx, units)?;
            remaining = units
                .checked_mul(size)
                .and_then(|taken| remaining.checked_sub(taken))
                .ok_or_else(overflow)?;
        }
    }

    if remaining > Decimal::ZERO {
        let idx = tally
            .smallest_covering(remaining)
            .unwrap_or_else(|| tally.len().saturating_sub(1));
        tally.add(idx, Decimal::ONE)?;
    }

    Ok(())
}

/// Per-size counters over the positive package sizes, sorted descending and deduplicated.
struct Tally {
    counts: SmallVec<[PackageCount; 4]>,
    target: Decimal,
}

impl Tally {
    fn new(packages: &[PackageSize], target: Decimal) -> Result<Self, AllocationError> {
        let mut counts: SmallVec<[PackageCount; 4]> = packages
            .iter()
            .filter(|p| p.size > Decimal::ZERO)
            .map(|p| PackageCount {
                size: p.size,
                coverage: p.coverage,
                count: Decimal::ZERO,
            })
            .collect();

        counts.sort_by(|a, b| b.size.cmp(&a.size));
        counts.dedup_by(|a, b| a.size == b.size);

        if counts.is_empty() {
            return Err(AllocationError::NoPackages);
        }

        Ok(Self { counts, target })
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn size(&self, idx: usize) -> Decimal {
        self.counts.get(idx).map_or(Decimal::ZERO, |c| c.size)
    }

    fn largest(&self) -> Decimal {
        self.size(0)
    }

    /// Index of the smallest size that is at least `quantity`.
    fn smallest_covering(&self, quantity: Decimal) -> Option<usize> {
        self.counts.iter().rposition(|c| c.size >= quantity)
    }

    fn add(&mut self, idx: usize, units: Decimal) -> Result<(), AllocationError> {
        let target = self.target;

        if let Some(entry) = self.counts.get_mut(idx) {
            entry.count = entry
                .count
                .checked_add(units)
                .ok_or(AllocationError::Overflow(target))?;
        }

        Ok(())
    }

    fn finish(mut self) -> Result<Allocation, AllocationError> {
        self.counts.retain(|c| c.count > Decimal::ZERO);

        let total_supplied = self
            .counts
            .iter()
            .try_fold(Decimal::ZERO, |total, c| {
                c.supplied().and_then(|supplied| total.checked_add(supplied))
            })
            .ok_or(AllocationError::Overflow(self.target))?;

        Ok(Allocation {
            counts: self.counts,
            total_supplied,
        })
    }
}
