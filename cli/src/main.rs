use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use option_schema_core::{DEFAULT_SIMILARITY, Schema, ValidationFlags, validate};
use option_schema_format::{
    FormatFlags, FormatterConfig, HelpFormatter, HelpSection, HelpStyles, format_warnings,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod document;

use document::SchemaDocument;

#[derive(Debug, Parser)]
#[command(name = "optschema", disable_help_subcommand = true)]
#[command(about = "Validate option schemas and preview their usage and help output")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a schema document and print its warnings.
    Validate(ValidateArgs),
    /// Print the help message of a schema document.
    Help(HelpArgs),
    /// Print only the usage statement of a schema document.
    Usage(UsageArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema document (.json, .yaml or .yml).
    file: PathBuf,
    /// Skip the similar-name and naming-convention checks.
    #[arg(long)]
    no_warnings: bool,
    /// Do not validate nested command schemas.
    #[arg(long)]
    no_recurse: bool,
    /// Similarity threshold (0.0-1.0) for reporting option names; 0 disables.
    #[arg(long, default_value_t = DEFAULT_SIMILARITY)]
    similarity: f64,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Wrap lines at this many columns.
    #[arg(long)]
    width: Option<usize>,
    /// Print without ANSI styles.
    #[arg(long)]
    no_color: bool,
    /// Program name printed in the usage statement.
    #[arg(long)]
    program: Option<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Schema document (.json, .yaml or .yml).
    file: PathBuf,
    #[command(flatten)]
    render: RenderArgs,
    /// Only list options whose names, group, synopsis or environment
    /// variables contain one of these terms.
    #[arg(long, num_args = 1..)]
    filter: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Schema document (.json, .yaml or .yml).
    file: PathBuf,
    #[command(flatten)]
    render: RenderArgs,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Help(args) => run_help(args),
        Command::Usage(args) => run_usage(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    if !(0.0..=1.0).contains(&args.similarity) {
        return Err("--similarity must be between 0.0 and 1.0".to_string());
    }
    let (_, schema) = load_schema(&args.file)?;
    let flags = ValidationFlags {
        no_warnings: args.no_warnings,
        no_recurse: args.no_recurse,
        similarity: args.similarity,
    };
    let report = validate(&schema, &flags).map_err(|err| err.to_string())?;

    if report.is_clean() {
        println!("Schema is valid.");
    } else {
        let config = FormatterConfig {
            styles: HelpStyles::plain(),
            ..Default::default()
        };
        print!("{}", format_warnings(&report, &config).wrap(None, true));
    }
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let (doc, schema) = load_checked_schema(&args.file)?;
    let mut sections = Vec::new();
    if let Some(description) = &doc.description {
        sections.push(HelpSection::text(description));
    }
    sections.push(HelpSection::usage());
    sections.push(HelpSection::groups());
    render(&doc, &schema, &sections, &args.render, args.filter);
    Ok(())
}

fn run_usage(args: UsageArgs) -> Result<(), String> {
    let (doc, schema) = load_checked_schema(&args.file)?;
    render(&doc, &schema, &[HelpSection::usage()], &args.render, Vec::new());
    Ok(())
}

fn load_schema(path: &Path) -> Result<(SchemaDocument, Schema), String> {
    let doc = SchemaDocument::load(path).map_err(|err| err.to_string())?;
    let schema = doc.to_schema().map_err(|err| err.to_string())?;
    debug!(path = %path.display(), options = schema.len(), "loaded schema document");
    Ok((doc, schema))
}

/// Loads a schema and rejects it when validation fails. Warnings are only
/// logged; `validate` reports them in full.
fn load_checked_schema(path: &Path) -> Result<(SchemaDocument, Schema), String> {
    let (doc, schema) = load_schema(path)?;
    let report = validate(&schema, &ValidationFlags::default()).map_err(|err| err.to_string())?;
    for warning in &report.warnings {
        warn!(kind = ?warning.kind(), "{warning}");
    }
    Ok((doc, schema))
}

fn render(
    doc: &SchemaDocument,
    schema: &Schema,
    sections: &[HelpSection],
    args: &RenderArgs,
    filter: Vec<String>,
) {
    let config = if args.no_color {
        FormatterConfig {
            styles: HelpStyles::plain(),
            ..Default::default()
        }
    } else {
        FormatterConfig::default()
    };
    let flags = FormatFlags {
        program_name: args.program.clone().or_else(|| doc.program.clone()),
        filter,
    };
    let message = HelpFormatter::new(schema)
        .with_config(config)
        .with_flags(flags)
        .format(sections);
    print!("{}", message.wrap(args.width, args.no_color));
}
