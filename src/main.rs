//! Infra Template CLI
//!
//! Usage:
//!   infra-template [OPTIONS] [STACK]
//!
//! Options:
//!   -f, --format <FORMAT>  yaml or json (defaults to the stack's format)
//!   -o, --output <PATH>    Output file, `-` for stdout
//!   -c, --config <FILE>    Environment file (TOML format)
//!   -l, --list             List the available stacks
//!   -h, --help             Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use infra_template::{
    render_stack, Environment, Format, GenerateError, RenderConfig, Stack, TemplateError,
};

#[derive(Parser)]
#[command(name = "infra-template")]
#[command(about = "Generate infrastructure templates from typed stack definitions")]
struct Cli {
    /// Stack to generate
    stack: Option<Stack>,

    /// Output format (defaults to the stack's preferred format)
    #[arg(short, long)]
    format: Option<Format>,

    /// Output file; `-` writes to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Environment file with account, region and naming settings (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write YAML intrinsic functions as `Fn::` mappings instead of `!Tag` short forms
    #[arg(long)]
    long_form: bool,

    /// Spaces per indentation level in JSON output
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// List the available stacks
    #[arg(short, long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Errors reported by the command line front end
#[derive(Debug, Error)]
enum CliError {
    #[error("no stack given")]
    NoStack,

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Error writing file '{}': {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        print_stacks();
        return;
    }

    match run(&cli) {
        Ok(Some(path)) => println!("Generated {}", path.display()),
        Ok(None) => {}
        Err(CliError::NoStack) => {
            eprintln!("Error: no stack given\n");
            print_stacks();
            std::process::exit(1);
        }
        Err(e) => {
            report(cli.stack, &e);
            std::process::exit(1);
        }
    }
}

/// Render the selected stack and write it out
///
/// Returns the written path, or `None` when the text went to stdout.
fn run(cli: &Cli) -> Result<Option<PathBuf>, CliError> {
    let stack = cli.stack.ok_or(CliError::NoStack)?;
    let format = cli.format.unwrap_or_else(|| stack.default_format());
    let config = RenderConfig::new()
        .with_format(format)
        .with_json_indent(cli.indent)
        .with_long_form(cli.long_form);

    // Render fully before touching the filesystem
    let rendered = generate(stack, cli.config.as_deref(), &config)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(stack.default_output(format)));
    if output.as_os_str() == "-" {
        print!("{}", rendered);
        return Ok(None);
    }

    fs::write(&output, rendered).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;
    Ok(Some(output))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(
    stack: Stack,
    config_path: Option<&Path>,
    config: &RenderConfig,
) -> Result<String, GenerateError> {
    let env = match config_path {
        Some(path) => Environment::from_file(path)?,
        None => Environment::default(),
    };
    Ok(render_stack(stack, &env, config)?)
}

fn report(stack: Option<Stack>, error: &CliError) {
    match error {
        CliError::Generate(GenerateError::Template(TemplateError::Substitution(e))) => {
            let name = stack.map_or("template", |s| s.name());
            eprint!("{}", e.format(name));
        }
        other => eprintln!("Error: {}", other),
    }
}

fn print_stacks() {
    println!("Available stacks:");
    for stack in Stack::ALL {
        println!(
            "    {:<16} {:<5} {}",
            stack.name(),
            stack.default_format().extension(),
            stack.summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_template::EnvironmentError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("infra-template").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_writes_stack_to_output() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output = dir.path().join("network.yaml");
        let cli = parse(&["vpc", "--output", output.to_str().unwrap()]);

        let written = run(&cli).unwrap();
        assert_eq!(written.as_deref(), Some(output.as_path()));
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("AWS::EC2::VPC"));
    }

    #[test]
    fn test_bad_config_writes_nothing() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = dir.path().join("env.toml");
        fs::write(&config, "[aws\nregion = 1").unwrap();
        let output = dir.path().join("network.yaml");
        let cli = parse(&[
            "vpc",
            "--config",
            config.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]);

        let err = run(&cli).unwrap_err();
        assert!(matches!(
            err,
            CliError::Generate(GenerateError::Environment(EnvironmentError::ParseError(_)))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_stack() {
        let cli = parse(&[]);
        assert!(matches!(run(&cli), Err(CliError::NoStack)));
    }

    #[test]
    fn test_format_flag_overrides_stack_default() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output = dir.path().join("bucket.yaml");
        let cli = parse(&[
            "secure-bucket",
            "--format",
            "yaml",
            "--output",
            output.to_str().unwrap(),
        ]);

        run(&cli).unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("Type: AWS::S3::Bucket"));
    }
}
