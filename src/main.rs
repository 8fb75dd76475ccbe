//! OpenAPI document generator - command-line tool.
//!
//! Reads an API manifest describing object types and endpoints and writes the
//! corresponding OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! oas3-docgen [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! oas3-docgen api.yaml -o openapi.yaml
//! ```
//!
//! Generate JSON documentation with an extra server:
//! ```bash
//! oas3-docgen api.yaml -f json --server https://api.example.com -o openapi.json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use oas3_docgen::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI document generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
