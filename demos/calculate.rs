//! Calculator Example
//!
//! Loads a configuration set from `fixtures/`, runs one calculation and prints the
//! recommendation.
//!
//! Use `-f` to pick the configuration set
//! Use `-i` to enter the value
//! Use `-o` / `--option2` to select dropdown options

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use minicalc::{
    calculator::{CalculationError, Calculator},
    source::KeyValueSource,
    utils::{ExampleCalculatorArgs, init_logging},
};

/// Calculator Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExampleCalculatorArgs::parse();

    init_logging(args.log_format)?;

    let source = KeyValueSource::from_set(PathBuf::from("fixtures"), &args.fixture)?;
    let calculator = Calculator::from_source(&source)?;
    let config = calculator.config();

    if !config.labels().description.is_empty() {
        println!("{}\n", config.labels().description);
    }

    for option in config.options() {
        println!("  [{}] {}", option.index, option.label);
    }

    println!(
        "{} {} {}\n",
        config.labels().input,
        args.input,
        config.provided_unit()
    );

    match calculator.calculate_input(&args.input, args.selection()) {
        Ok(result) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();

            result.write_to(&mut handle)?;
        }
        Err(CalculationError::InvalidInput(_)) => println!("{}", config.labels().invalid_value),
        Err(err @ CalculationError::InputOutOfRange(_)) => println!("{err}"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
