//! Quarry CLI - Compile dataset schemas and rewrite SQL
//!
//! Usage:
//!   quarry compile <schema.json|schema.toml> [--dialect <dialect>] [--dataset-root <dir>]
//!   quarry head <schema> [--rows <n>]
//!   quarry count <schema>
//!   quarry rewrite <file.sql|-> --map <name>=<target> [--dialect <dialect>]
//!   quarry transpile <file.sql|-> --to <dialect> [--from <dialect>]
//!   quarry tables <file.sql|-> [--dialect <dialect>]
//!
//! Settings are read from `QUARRY_CONFIG`, `./quarry.toml` or the user config
//! directory; command-line flags win. Set `QUARRY_LOG=debug` to see every
//! compiled or rewritten statement.

use clap::{Parser, Subcommand, ValueEnum};
use quarry::compiler::{self, CompileOptions};
use quarry::config::Settings;
use quarry::model::Schema;
use quarry::rewrite::{self, TableMapping};
use quarry::sql::Dialect;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Quarry - Compile dataset schemas to multi-dialect SQL and rewrite SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a schema document to its full query
    Compile {
        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Compile a preview query for a schema
    Head {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Number of rows (defaults to the configured head size)
        #[arg(short = 'n', long)]
        rows: Option<u64>,
    },

    /// Compile a row-count query for a schema
    Count {
        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Replace logical table names in a SQL statement
    Rewrite {
        /// SQL file, or `-` for stdin
        input: PathBuf,

        /// Mapping entry, `name=target`; repeatable, overrides [mappings]
        #[arg(short, long = "map", value_name = "NAME=TARGET")]
        mappings: Vec<String>,

        /// Dialect used to parse and quote the statement
        #[arg(short, long, default_value = "duckdb")]
        dialect: DialectArg,
    },

    /// Translate a SQL statement to another dialect
    Transpile {
        /// SQL file, or `-` for stdin
        input: PathBuf,

        /// Target dialect
        #[arg(short, long)]
        to: DialectArg,

        /// Source dialect (generic grammar if omitted)
        #[arg(short, long)]
        from: Option<DialectArg>,
    },

    /// List the tables a SQL script reads
    Tables {
        /// SQL file, or `-` for stdin
        input: PathBuf,

        #[arg(short, long, default_value = "postgres")]
        dialect: DialectArg,
    },
}

#[derive(clap::Args)]
struct SchemaArgs {
    /// Schema document (.json or .toml), or `-` for JSON on stdin
    file: PathBuf,

    /// SQL dialect to generate (defaults to the source's own)
    #[arg(short, long)]
    dialect: Option<DialectArg>,

    /// Directory relative file paths are resolved against
    #[arg(long)]
    dataset_root: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Duckdb,
    Postgres,
    Mysql,
    Tsql,
    Snowflake,
    Bigquery,
    Redshift,
    Databricks,
    Oracle,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Bigquery => Dialect::BigQuery,
            DialectArg::Redshift => Dialect::Redshift,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Oracle => Dialect::Oracle,
        }
    }
}

#[derive(Clone, Copy)]
enum QueryKind {
    Full,
    Head(Option<u64>),
    Count,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QUARRY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile { schema } => cmd_compile(&settings, schema, QueryKind::Full),
        Commands::Head { schema, rows } => cmd_compile(&settings, schema, QueryKind::Head(rows)),
        Commands::Count { schema } => cmd_compile(&settings, schema, QueryKind::Count),
        Commands::Rewrite {
            input,
            mappings,
            dialect,
        } => cmd_rewrite(&settings, input, mappings, dialect.into()),
        Commands::Transpile { input, to, from } => {
            cmd_transpile(input, to.into(), from.map(Dialect::from))
        }
        Commands::Tables { input, dialect } => cmd_tables(input, dialect.into()),
    }
}

fn cmd_compile(settings: &Settings, args: SchemaArgs, kind: QueryKind) -> ExitCode {
    let mut options = match settings.compile_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dialect) = args.dialect {
        options = options.with_dialect(dialect.into());
    }
    if let Some(root) = args.dataset_root {
        options = options.with_dataset_root(root);
    }

    let schema = match load_schema(&args.file) {
        Ok(s) => s,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    match compile(&schema, &options, kind) {
        Ok(compiled) => {
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn compile(
    schema: &Schema,
    options: &CompileOptions,
    kind: QueryKind,
) -> compiler::CompileResult<compiler::CompiledQuery> {
    match kind {
        QueryKind::Full => compiler::build_query(schema, options),
        QueryKind::Head(rows) => compiler::build_head_query(schema, options, rows),
        QueryKind::Count => compiler::build_row_count_query(schema, options),
    }
}

fn load_schema(path: &Path) -> Result<Schema, String> {
    let source = read_input(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let result = if is_toml {
        Schema::from_toml(&source)
    } else {
        Schema::from_json(&source)
    };
    result.map_err(|e| format!("Invalid schema '{}': {}", path.display(), e))
}

fn cmd_rewrite(
    settings: &Settings,
    input: PathBuf,
    overrides: Vec<String>,
    dialect: Dialect,
) -> ExitCode {
    let mut entries = settings.mappings.clone();
    for entry in &overrides {
        match entry.split_once('=') {
            Some((name, target)) => {
                entries.insert(name.trim().to_string(), target.to_string());
            }
            None => {
                eprintln!("Invalid mapping '{}': expected NAME=TARGET", entry);
                return ExitCode::FAILURE;
            }
        }
    }

    let mapping = match TableMapping::new(entries, Some(dialect)) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    with_sql(input, |sql| rewrite::substitute_tables(sql, &mapping, dialect))
}

fn cmd_transpile(input: PathBuf, to: Dialect, from: Option<Dialect>) -> ExitCode {
    with_sql(input, |sql| rewrite::transpile(sql, to, from))
}

fn cmd_tables(input: PathBuf, dialect: Dialect) -> ExitCode {
    with_sql(input, |sql| {
        rewrite::extract_table_names(sql, Some(dialect)).map(|names| names.join("\n"))
    })
}

/// Read SQL from `input`, run `op` and print its output.
fn with_sql(
    input: PathBuf,
    op: impl FnOnce(&str) -> rewrite::RewriteResult<String>,
) -> ExitCode {
    let sql = match read_input(&input) {
        Ok(s) => s,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    match op(&sql) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Error reading stdin: {}", e))?;
        return Ok(buffer);
    }
    fs::read_to_string(path).map_err(|e| format!("Error reading file '{}': {}", path.display(), e))
}
