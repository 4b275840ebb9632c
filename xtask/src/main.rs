// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result};
use aug_error::{ErrorReport, StackOptions};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Repo maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate JSON Schemas for the stack options and error report types.
    Schema {
        /// Output directory.
        #[arg(long, default_value = "contracts/schemas")]
        out_dir: PathBuf,
    },
    /// Parse and validate a stack options TOML file.
    CheckOptions {
        /// Path to the TOML file.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Schema { out_dir } => schema(&out_dir),
        Command::CheckOptions { path } => check_options(&path),
    }
}

fn schema(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("create schema output dir")?;

    let options = schema_for!(StackOptions);
    let report = schema_for!(ErrorReport);

    write_schema(&out_dir.join("stack_options.schema.json"), &options)?;
    write_schema(&out_dir.join("error_report.schema.json"), &report)?;

    eprintln!("wrote schemas to {}", out_dir.display());
    Ok(())
}

fn check_options(path: &Path) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let options = StackOptions::from_toml(&content)
        .with_context(|| format!("invalid stack options in {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}

fn write_schema(path: &Path, schema: &schemars::Schema) -> Result<()> {
    let s = serde_json::to_string_pretty(schema)?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
