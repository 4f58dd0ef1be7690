use std::{fmt::Write as _, path::PathBuf, process::ExitCode};

use clap::Parser;
use scim_filter::{
    Filter, FilterError, ParserOptions,
    config::{AppConfig, ConfigError},
    observability::init_tracing,
    tokenize,
};

#[derive(Parser, Debug)]
#[command(version, about = "Parse SCIM 2.0 filter expressions", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Maximum filter length in bytes (overrides the config file)
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Maximum nesting depth of groups, negations and value filters
    /// (overrides the config file)
    #[arg(long, global = true)]
    max_depth: Option<usize>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Parse a filter and print its syntax tree
    Parse {
        /// The filter expression, e.g. 'userName eq "bjensen"'
        filter: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the tokens of a filter with their positions
    Tokens {
        /// The filter expression
        filter: String,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Canonical filter string
    Text,
    /// JSON syntax tree
    Json,
    /// Indented node list with ids and parent links
    Debug,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Failed to serialize syntax tree: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Warning: {e}");
    }

    let result = match &args.command {
        Command::Parse { filter, format } => run_parse(filter, *format, config.parser),
        Command::Tokens { filter } => run_tokens(filter),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Load the config file (if any) and apply command-line overrides.
fn load_config(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(max_length) = args.max_length {
        config.parser.max_length = max_length;
    }
    if let Some(max_depth) = args.max_depth {
        config.parser.max_depth = max_depth;
    }

    config.validate()?;
    Ok(config)
}

fn run_parse(input: &str, format: OutputFormat, options: ParserOptions) -> Result<String, CliError> {
    let filter = scim_filter::Parser::with_options(options).parse(input)?;

    let output = match (format, &filter) {
        (OutputFormat::Json, _) => serde_json::to_string_pretty(&filter)?,
        (_, None) => String::new(),
        (OutputFormat::Text, Some(filter)) => filter.to_string(),
        (OutputFormat::Debug, Some(filter)) => render_tree(filter),
    };

    Ok(output)
}

fn run_tokens(input: &str) -> Result<String, CliError> {
    let mut out = String::new();
    for token in tokenize(input)? {
        let position = token.position();
        let _ = writeln!(
            out,
            "{}:{}\t{:?}\t{}",
            position.line,
            position.column,
            token.kind(),
            token.text()
        );
    }
    Ok(out.trim_end().to_string())
}

/// One line per node, indented by depth, naming the node's id and its parent's.
fn render_tree(filter: &Filter) -> String {
    let mut out = String::new();
    for node in filter.descendants() {
        let depth = node.ancestors().count();
        let parent = match node.parent() {
            Some(parent) => format!("#{}", parent.id().index()),
            None => "none".to_string(),
        };
        let _ = writeln!(
            out,
            "{:indent$}{} #{} (parent {}): {}",
            "",
            node.kind(),
            node.id().index(),
            parent,
            node,
            indent = depth * 2
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args() {
        let args = Args::try_parse_from([
            "scim-filter",
            "parse",
            "userName pr",
            "--format",
            "json",
            "--max-depth",
            "4",
        ])
        .unwrap();

        assert_eq!(args.max_depth, Some(4));
        assert!(matches!(
            args.command,
            Command::Parse { ref filter, format: OutputFormat::Json } if filter == "userName pr"
        ));
    }

    #[test]
    fn test_overrides_apply_to_defaults() {
        let args =
            Args::try_parse_from(["scim-filter", "tokens", "x pr", "--max-length", "10"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.parser.max_length, 10);
        assert_eq!(config.parser.max_depth, scim_filter::scim::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_zero_override_rejected() {
        let args =
            Args::try_parse_from(["scim-filter", "tokens", "x pr", "--max-depth", "0"]).unwrap();
        assert!(matches!(load_config(&args), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_run_parse_text() {
        let output = run_parse(
            "userName EQ \"bjensen\" AND ((active eq true))",
            OutputFormat::Text,
            ParserOptions::default(),
        )
        .unwrap();
        assert_eq!(output, "userName eq \"bjensen\" and active eq true");
    }

    #[test]
    fn test_run_parse_empty() {
        let options = ParserOptions::default();
        assert_eq!(run_parse("()", OutputFormat::Text, options).unwrap(), "");
        assert_eq!(run_parse("()", OutputFormat::Json, options).unwrap(), "null");
    }

    #[test]
    fn test_run_parse_json() {
        let output = run_parse("userName pr", OutputFormat::Json, ParserOptions::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["type"], "Comparison");
        assert_eq!(json["operator"], "pr");
    }

    #[test]
    fn test_run_parse_debug_tree() {
        let output = run_parse("not (a pr)", OutputFormat::Debug, ParserOptions::default()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Negation #"), "{output}");
        assert!(lines[0].contains("(parent none)"), "{output}");
        assert!(lines[1].starts_with("  Comparison #"), "{output}");
        assert!(lines[2].starts_with("    AttributePath #"), "{output}");
    }

    #[test]
    fn test_run_parse_error() {
        let err = run_parse("userName eq", OutputFormat::Text, ParserOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected end of string.");
    }

    #[test]
    fn test_run_tokens() {
        let output = run_tokens("name.givenName sw \"J\"").unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                "1:1\tIdentifier\tname",
                "1:5\tDot\t.",
                "1:6\tIdentifier\tgivenName",
                "1:16\tOperator\tsw",
                "1:19\tString\t\"J\"",
            ]
        );
    }
}
