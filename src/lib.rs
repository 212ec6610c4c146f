//! Minicalc
//!
//! Minicalc is the quantity engine behind the mini calculator shown on product pages. It
//! reads the calculator configuration a page declares, resolves the multiplier for the
//! shopper's entry and, for products sold in packages, recommends which packages to buy.

pub mod calculator;
pub mod config;
pub mod extract;
pub mod multiplier;
pub mod numbers;
pub mod packages;
pub mod prelude;
pub mod result;
pub mod source;
pub mod utils;
