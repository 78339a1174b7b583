//! Reflekt CLI - LESS stylesheet parsing and debugging tool
//!
//! Usage:
//!   reflekt <file>              Parse and display the resolved stylesheet
//!   reflekt <file> --json       Output the stylesheet and warnings as JSON
//!   reflekt <file> --tokens     Show lexer tokens
//!
//! Examples:
//!   reflekt theme.less
//!   reflekt theme.less --json --seed 7
//!   reflekt --less '.btn { color: red; }'

mod loader;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use reflekt_common::warning::set_quiet;
use reflekt_less::parser::DEFAULT_MAX_DEPTH;
use reflekt_less::{
    Block, BlockKind, IdGenerator, ParseOptions, Parsed, RandomIds, SeededIds, Value, parse_with,
    tokenize,
};

/// Reflekt - parse LESS stylesheets into typed style blocks
#[derive(Parser, Debug)]
#[command(name = "reflekt")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the resolved stylesheet
    reflekt theme.less

    # JSON output with reproducible ids for anonymous blocks
    reflekt theme.less --json --seed 7

    # Show tokens
    reflekt --less '.btn { color: red; }' --tokens
"#)]
struct Cli {
    /// Stylesheet file; `@import`s are inlined relative to it
    #[arg(value_name = "FILE", required_unless_present = "less")]
    path: Option<PathBuf>,

    /// Parse a LESS string directly instead of a file
    #[arg(long, value_name = "LESS", conflicts_with = "path")]
    less: Option<String>,

    /// Output the stylesheet and warnings as JSON
    #[arg(short, long, conflicts_with = "tokens")]
    json: bool,

    /// Show lexer tokens instead of the stylesheet
    #[arg(short, long)]
    tokens: bool,

    /// Fail on the first structural warning
    #[arg(long)]
    strict: bool,

    /// Deepest allowed block nesting
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Seed for anonymous block ids (random when omitted)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Don't echo warnings to stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    set_quiet(cli.quiet);

    let source = load_source(&cli)?;

    if cli.tokens {
        print_tokens(&source)?;
        return Ok(());
    }

    let options = ParseOptions::default()
        .with_strict(cli.strict)
        .with_max_depth(cli.max_depth);
    let mut ids: Box<dyn IdGenerator> = match cli.seed {
        Some(seed) => Box::new(SeededIds::new(seed)),
        None => Box::new(RandomIds),
    };
    let parsed = parse_with(&source, &options, ids.as_mut()).context("failed to parse stylesheet")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        print_stylesheet(&parsed);
    }
    Ok(())
}

/// Read the input named on the command line.
fn load_source(cli: &Cli) -> Result<String> {
    if let Some(ref less) = cli.less {
        Ok(less.clone())
    } else if let Some(ref path) = cli.path {
        loader::load_with_imports(path)
    } else {
        anyhow::bail!("no input file or --less provided")
    }
}

fn print_tokens(source: &str) -> Result<()> {
    let tokens = tokenize(source)?;
    println!("=== Tokens ({}) ===", tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        println!(
            "  {:4}: {:<14} {:?} {}",
            i,
            token.kind.name().cyan(),
            token.text,
            format!("@{}..{}", token.span.start, token.span.end).dimmed()
        );
    }
    Ok(())
}

fn print_stylesheet(parsed: &Parsed) {
    let stylesheet = &parsed.stylesheet;

    if !stylesheet.variables().is_empty() {
        println!("=== Variables ({}) ===", stylesheet.variables().len());
        for (name, value) in stylesheet.variables() {
            println!("  {} = {}", format!("@{name}").magenta(), describe(value));
        }
        println!();
    }

    println!("=== Stylesheet ({} blocks) ===", stylesheet.len());
    for block in stylesheet.blocks() {
        print_block(block, 1);
    }

    if !parsed.warnings.is_empty() {
        println!();
        println!("{}", format!("{} warning(s)", parsed.warnings.len()).yellow());
    }
}

fn print_block(block: &Block, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = match &block.kind {
        BlockKind::Anonymous => format!("{{anonymous {}}}", block.key),
        _ => block.key.clone(),
    };

    if block.is_empty_marker() {
        println!("{indent}{} {}", label.cyan(), "(no body)".dimmed());
        return;
    }

    println!("{indent}{}", label.cyan().bold());
    for declaration in &block.declarations {
        let important = if declaration.important {
            format!(" {}", "!important".red())
        } else {
            String::new()
        };
        println!(
            "{indent}  {}: {}{important}",
            declaration.key.green(),
            describe(&declaration.value)
        );
    }
    for nested in &block.nested {
        print_block(nested, depth + 1);
    }
}

/// Value text followed by its resolved type.
fn describe(value: &Value) -> String {
    let kind = match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Color(_) => "color",
        Value::Hash(_) => "hash",
        Value::Keyword(_) if value.as_color().is_some() => "color keyword",
        Value::Keyword(_) => "keyword",
        Value::Url(_) => "url",
        Value::Function { .. } => "function",
        Value::UnicodeRange(_) => "unicode-range",
        Value::List(_) => "list",
        Value::CommaList(_) => "comma list",
        Value::Raw(_) => "raw",
    };
    format!("{value} {}", format!("[{kind}]").dimmed())
}
