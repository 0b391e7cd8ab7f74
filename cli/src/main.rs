#![deny(missing_docs)]

//! # apischema CLI
//!
//! Command line front-end for the schema generator.
//!
//! Supported Commands:
//! - `generate`: Renders the schema of a project file.
//! - `endpoints`: Lists the discovered endpoints.
//! - `serve`: Serves the schema over HTTP (feature `server`).

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod endpoints;
mod error;
mod generate;
mod project;
#[cfg(feature = "server")]
mod serve;

#[derive(Parser, Debug)]
#[clap(author, version, about = "REST API schema generator")]
struct Cli {
    /// Log at debug level, overriding RUST_LOG.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the schema document.
    Generate(generate::GenerateArgs),
    /// List endpoints in schema order.
    Endpoints(endpoints::EndpointsArgs),
    /// Serve the schema over HTTP.
    #[cfg(feature = "server")]
    Serve(serve::ServeArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Endpoints(args) => endpoints::execute(args)?,
        #[cfg(feature = "server")]
        Commands::Serve(args) => serve::execute(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "apischema",
            "-v",
            "generate",
            "--urlconf",
            "project.yaml",
            "--format",
            "yaml",
            "--user",
            "ann",
            "--staff",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.format, generate::Format::Yaml);
        assert!(args.staff);
    }

    #[test]
    fn test_staff_requires_user() {
        let res = Cli::try_parse_from([
            "apischema",
            "generate",
            "--urlconf",
            "project.yaml",
            "--staff",
        ]);
        assert!(res.is_err());
    }
}
