//! flexfields CLI
//!
//! Command-line interface for rendering JSON documents with sparse
//! fieldsets and relation expansion, and for inspecting the eager-load
//! plan a request would produce.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flexfields::{
    load_json, load_registry_auto, plan, render, split_list, Identifier, RenderOptions,
};

#[derive(Parser)]
#[command(name = "flexfields")]
#[command(about = "Render JSON documents with sparse fieldsets and relation expansion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an object file per fields/omit/expand parameters
    Render {
        /// Object document to render (JSON file)
        object: PathBuf,

        /// Schema declaration source: file path or URL (http:// or https://)
        #[arg(long)]
        schema: String,

        /// Root type name to render the object as
        #[arg(long = "type", short = 't')]
        type_name: String,

        /// Fields to retain (comma/whitespace delimited, dotted paths)
        #[arg(long)]
        fields: Option<String>,

        /// Fields to drop (comma/whitespace delimited, dotted paths)
        #[arg(long)]
        omit: Option<String>,

        /// Relations to expand (comma/whitespace delimited, dotted paths)
        #[arg(long)]
        expand: Option<String>,

        /// Identifier override: id, name or reference
        #[arg(long)]
        identifier: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the eager-load hints an expand request produces
    Plan {
        /// Expand paths (dotted, `*` wildcard allowed)
        expand: Vec<String>,

        /// Schema declaration source: file path or URL
        #[arg(long)]
        schema: String,

        /// Root type name the query starts from
        #[arg(long = "type", short = 't')]
        type_name: String,

        /// Identifier override; name/reference switch on slug-mode hints
        #[arg(long)]
        identifier: Option<String>,

        /// Output the plan as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Load and validate a schema declaration file
    Check {
        /// Schema declaration source: file path or URL
        schema: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            object,
            schema,
            type_name,
            fields,
            omit,
            expand,
            identifier,
            output,
            pretty,
        } => run_render(RenderArgs {
            object,
            schema,
            type_name,
            fields,
            omit,
            expand,
            identifier,
            output,
            pretty,
        }),

        Commands::Plan {
            expand,
            schema,
            type_name,
            identifier,
            json,
        } => run_plan(&expand, &schema, &type_name, identifier.as_deref(), json),

        Commands::Check { schema } => run_check(&schema),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct RenderArgs {
    object: PathBuf,
    schema: String,
    type_name: String,
    fields: Option<String>,
    omit: Option<String>,
    expand: Option<String>,
    identifier: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_render(args: RenderArgs) -> Result<(), u8> {
    let registry = load_registry_auto(&args.schema).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let object = load_json(&args.object).map_err(|e| {
        eprintln!("Error loading object: {}", e);
        e.exit_code() as u8
    })?;

    let mut options = RenderOptions::new();
    if let Some(fields) = &args.fields {
        options.fields = split_list(fields);
    }
    if let Some(omit) = &args.omit {
        options.omit = split_list(omit);
    }
    if let Some(expand) = &args.expand {
        options.expand = split_list(expand);
    }
    options.identifier = parse_identifier(args.identifier.as_deref())?;

    let doc = render(&object, &args.type_name, &registry, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if args.pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_plan(
    expand: &[String],
    schema: &str,
    type_name: &str,
    identifier: Option<&str>,
    json: bool,
) -> Result<(), u8> {
    let registry = load_registry_auto(schema).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let slug_mode = parse_identifier(identifier)?.is_some_and(|i| i.is_slug());

    let query_plan = plan(expand, type_name, &registry, slug_mode).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&query_plan).unwrap());
    } else if query_plan.is_empty() {
        println!("No eager-load hints.");
    } else {
        for path in &query_plan.select_related {
            println!("select_related: {}", path);
        }
        for path in &query_plan.prefetch_related {
            println!("prefetch_related: {}", path);
        }
    }

    Ok(())
}

fn run_check(schema: &str) -> Result<(), u8> {
    match load_registry_auto(schema) {
        Ok(registry) => {
            println!(
                "OK: {} type(s): {}",
                registry.len(),
                registry.type_names().join(", ")
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e.exit_code() as u8)
        }
    }
}

/// Parse the --identifier flag. Unlike query parameters, an explicit CLI
/// flag with an unknown value is an error.
fn parse_identifier(value: Option<&str>) -> Result<Option<Identifier>, u8> {
    match value {
        None => Ok(None),
        Some(s) => Identifier::parse(s).map(Some).ok_or_else(|| {
            eprintln!(
                "Error: unknown identifier \"{}\": expected id, name, or reference",
                s
            );
            2u8
        }),
    }
}
