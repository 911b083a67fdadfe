use std::{fs::File, path::PathBuf};

use clap::Parser;
use stacked_errors::{Result, StackableErr};
use tool_tester::aggregate::{count_by, write_counts, DEFAULT_KEY_COLUMN, DEFAULT_VALUE_COLUMN};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Counts the rows of a CSV table per group of a key column
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    #[arg(long, default_value = "./Input/msda_data.csv")]
    input: PathBuf,
    #[arg(long, default_value = "./Output/result.csv")]
    output: PathBuf,
    /// The column to group by
    #[arg(long, default_value = DEFAULT_KEY_COLUMN)]
    key: String,
    /// Rows are only counted when this column is not empty
    #[arg(long, default_value = DEFAULT_VALUE_COLUMN)]
    value: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let input = File::open(&args.input).stack_err_with(|| format!("opening {:?}", args.input))?;
    let counts = count_by(input, &args.key, &args.value).stack()?;
    let output =
        File::create(&args.output).stack_err_with(|| format!("creating {:?}", args.output))?;
    write_counts(output, &args.key, &args.value, &counts).stack()?;
    info!("wrote {} groups to {:?}", counts.len(), args.output);
    Ok(())
}
