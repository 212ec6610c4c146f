//! Property checks for package allocation and range precedence.

use minicalc::prelude::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn package_sizes() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((1_i64..=5_000).prop_map(|cents| Decimal::new(cents, 2)), 1..5)
}

fn target() -> impl Strategy<Value = Decimal> {
    (0_i64..=1_000_000).prop_map(|thousandths| Decimal::new(thousandths, 3))
}

fn supplied(allocation: &Allocation) -> Decimal {
    allocation
        .counts()
        .iter()
        .map(|c| c.size * c.count)
        .sum()
}

proptest! {
    #[test]
    fn divisor_allocation_covers_the_target(sizes in package_sizes(), target in target()) {
        let packages: Vec<PackageSize> = sizes.into_iter().map(PackageSize::new).collect();

        let allocation = allocate(target, &packages, AllocationMode::Divisor)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(supplied(&allocation), allocation.total_supplied());
        prop_assert!(allocation.total_supplied() >= target);
        prop_assert!(allocation.counts().is_sorted_by(|a, b| a.size > b.size));
        prop_assert!(allocation.counts().iter().all(|c| c.count > Decimal::ZERO));
    }

    #[test]
    fn coverage_allocation_covers_the_target(sizes in package_sizes(), target in target()) {
        let packages: Vec<PackageSize> = sizes
            .into_iter()
            .map(|size| PackageSize::with_coverage(size, size * Decimal::TEN))
            .collect();

        let allocation = allocate(target, &packages, AllocationMode::Coverage)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(supplied(&allocation), allocation.total_supplied());
        prop_assert!(allocation.total_supplied() >= target);
    }

    #[test]
    fn first_declared_range_wins(
        lower in 0_i64..100,
        width in 1_i64..100,
        overlap in 0_i64..100,
        offset in 0_i64..100,
    ) {
        let min = Decimal::from(lower);
        let max = Decimal::from(lower + width);
        let input = Decimal::from(lower + offset.min(width));
        let config = CalculatorConfig::default().with_ranges(
            RangeKey::Global,
            [
                QuantityRange::new(min, max, Decimal::TWO),
                QuantityRange::new(min - Decimal::from(overlap), max, Decimal::from(3)),
            ],
        );

        let resolved = resolve_with_source(&config, input, Selection::none());

        prop_assert_eq!(resolved.value, Decimal::TWO);
        prop_assert_eq!(resolved.source, MultiplierSource::Range(RangeKey::Global, 1));
    }
}
