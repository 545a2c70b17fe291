//! personjobdept CLI - create and inspect the Person / Job / Department database

use clap::{Parser, Subcommand, ValueEnum};
use personjobdept::config::{self, PersonJobDeptConfig};
use personjobdept::storage::schema::{self, SCHEMA};
use personjobdept::{ui, Database};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "personjobdept")]
#[command(version)]
#[command(about = "Person / Job / Department schema over an embedded SQLite database")]
#[command(long_about = r#"
personjobdept creates a SQLite database holding four tables:
  • person        keyed by person_name
  • job           keyed by job_name, references person
  • department    keyed by dept_num, references job
  • personnumkey  unkeyed person variant

Foreign-key enforcement is switched on for every connection.

Example usage:
  personjobdept init
  personjobdept schema --sql
  personjobdept check --database people.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file (if needed) and apply the schema
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show the schema definition
    Schema {
        /// Print the generated DDL instead of a table
        #[arg(long)]
        sql: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Show row counts per table
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Report foreign-key enforcement and dangling references
    Check {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            config
                .as_ref()
                .and_then(|c| c.log_level.as_deref())
                .unwrap_or("info"),
        )
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { database } => {
            let db = open_database(database, config.as_ref())?;
            ui::success(&format!("Schema applied to {}", db.location()));
            ui::info("Foreign keys", if db.foreign_keys_enabled()? { "on" } else { "off" });
            db.close()?;
        }

        Commands::Schema { sql, format } => {
            if sql {
                for stmt in schema::all_schema_statements() {
                    println!("{};", stmt);
                }
            } else if format == Format::Json {
                let tables: Vec<serde_json::Value> = SCHEMA
                    .iter()
                    .map(|t| {
                        let columns: Vec<serde_json::Value> = t
                            .columns
                            .iter()
                            .map(|c| {
                                let references = c.references.map(|fk| {
                                    serde_json::json!({
                                        "target": format!("{}.{}", fk.table, fk.column),
                                        "related_name": fk.related_name,
                                    })
                                });
                                serde_json::json!({
                                    "name": c.name,
                                    "type": c.ty.sql_type(),
                                    "nullable": c.nullable,
                                    "references": references,
                                })
                            })
                            .collect();
                        serde_json::json!({
                            "table": t.name,
                            "record": t.record,
                            "primary_key": t.primary_key().map(|c| c.name),
                            "columns": columns,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for line in schema::summary() {
                    ui::header(&line);
                }
                println!("{}", ui::columns_table(&SCHEMA));
            }
        }

        Commands::Stats { database, format } => {
            let db = open_database(database, config.as_ref())?;
            let stats = db.stats()?;

            if format == Format::Json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                ui::section(&format!("Statistics ({})", db.location()));
                println!("{}", ui::stats_table(&stats));
            }
        }

        Commands::Check { database } => {
            let db = open_database(database, config.as_ref())?;

            if db.foreign_keys_enabled()? {
                ui::success("Foreign key enforcement is on");
            } else {
                ui::warn("Foreign key enforcement is off");
            }

            let violations = db.foreign_key_violations()?;
            if violations.is_empty() {
                ui::success("No dangling references");
            } else {
                ui::error(&format!("{} dangling reference(s)", violations.len()));
                println!("{}", ui::violations_table(&violations));
                anyhow::bail!("foreign key check failed for {}", db.location());
            }
        }
    }

    Ok(())
}

fn open_database(
    flag: Option<PathBuf>,
    config: Option<&PersonJobDeptConfig>,
) -> anyhow::Result<Database> {
    let path = config::resolve_database_path(flag, config);
    config::ensure_db_dir(&path)?;
    tracing::info!("Using database {:?}", path);
    Ok(Database::open(&path)?)
}
