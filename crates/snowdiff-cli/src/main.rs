use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use snowdiff_catalog::{Catalog, SnowflakeWarehouse, Warehouse};
use snowdiff_core::{Config, DiffBucket};
use snowdiff_engine::{resolve_table, DiffClassifier, DiffOutcome, SqlDiffEngine, TableChoices};

/// snowdiff - row-level table comparison for Snowflake
#[derive(Parser)]
#[command(name = "snowdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: snowdiff.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List databases, most recently created first
    Databases,

    /// List schemas in a database
    Schemas {
        /// Database name
        database: String,
    },

    /// List tables in a schema
    Tables {
        /// Database name
        database: String,

        /// Schema name
        schema: String,
    },

    /// List columns of a table, in catalog order
    Columns {
        /// Database name
        database: String,

        /// Schema name
        schema: String,

        /// Table name
        table: String,
    },

    /// Compare two tables and export the three diff buckets
    Compare {
        /// Source table as DATABASE.SCHEMA.TABLE
        #[arg(long)]
        source: String,

        /// Unique key column of the source table
        #[arg(long)]
        source_key: String,

        /// Target table as DATABASE.SCHEMA.TABLE
        #[arg(long)]
        target: String,

        /// Unique key column of the target table
        #[arg(long)]
        target_key: String,

        /// Directory the bucket CSVs and summary are written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snowdiff=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if std::path::Path::new("snowdiff.toml").exists() {
        Config::from_file(std::path::Path::new("snowdiff.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    let catalog = connect(&config, cli.verbose).await?;

    match cli.command {
        Commands::Databases => {
            print_listing("Databases", catalog.list_databases().await?);
        }
        Commands::Schemas { database } => {
            print_listing("Schemas", catalog.list_schemas(&database).await?);
        }
        Commands::Tables { database, schema } => {
            print_listing("Tables", catalog.list_tables(&database, &schema).await?);
        }
        Commands::Columns {
            database,
            schema,
            table,
        } => {
            let columns = catalog.list_columns(&database, &schema, &table).await?;
            print_listing(
                "Columns",
                columns.into_iter().map(|c| c.name).collect::<Vec<_>>(),
            );
        }
        Commands::Compare {
            source,
            source_key,
            target,
            target_key,
            output_dir,
        } => {
            compare_command(
                &catalog,
                &source,
                &source_key,
                &target,
                &target_key,
                &output_dir,
                cli.verbose,
            )
            .await?;
        }
    }

    Ok(())
}

/// Build the shared warehouse handle and catalog from config
async fn connect(config: &Config, verbose: bool) -> Result<Catalog> {
    let warehouse_config = config.warehouse.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No warehouse configuration found in snowdiff.toml. \
             Add a [warehouse] section with type and connection settings."
        )
    })?;

    let warehouse: Arc<dyn Warehouse> = match warehouse_config.warehouse_type.to_lowercase().as_str()
    {
        "snowflake" => {
            let account = warehouse_config.required("account")?;
            let username = warehouse_config.required("username")?;

            let mut builder = if let Some(private_key) =
                warehouse_config.settings.get("private_key_pem")
            {
                SnowflakeWarehouse::builder().with_key_pair(account, username, private_key)
            } else {
                let password = warehouse_config.required("password")?;
                SnowflakeWarehouse::builder().with_password(account, username, password)
            };

            if let Some(compute) = warehouse_config.settings.get("warehouse") {
                builder = builder.with_compute_warehouse(compute);
            }
            if let Some(role) = warehouse_config.settings.get("role") {
                builder = builder.with_role(role);
            }
            if let Some(database) = warehouse_config.settings.get("database") {
                builder = builder.with_database(database);
            }

            Arc::new(builder.build()?)
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported warehouse type '{}'. Supported: snowflake",
                other
            ));
        }
    };

    if verbose {
        eprintln!("{}", "Testing warehouse connection...".cyan());
    }

    warehouse
        .test_connection()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;

    if verbose {
        eprintln!("{}", "✓ Connection successful".green());
    }

    Ok(Catalog::new(warehouse, config.cache_ttl()))
}

fn print_listing(heading: &str, names: Vec<String>) {
    println!("{}", heading.bold());
    for name in names {
        println!("  {}", name);
    }
}

/// Compare command - resolve both sides, classify, export
async fn compare_command(
    catalog: &Catalog,
    source: &str,
    source_key: &str,
    target: &str,
    target_key: &str,
    output_dir: &std::path::Path,
    verbose: bool,
) -> Result<()> {
    let source_choices = TableChoices::parse(source, source_key)?;
    let target_choices = TableChoices::parse(target, target_key)?;

    if verbose {
        eprintln!("{} {}", "Resolving source table:".cyan(), source);
    }
    let resolved_source = resolve_table(catalog, &source_choices).await;
    if resolved_source.is_none() {
        eprintln!(
            "{}",
            "Error loading Source Table. Please select a valid (non-empty) schema/table combination."
                .red()
        );
    }

    if verbose {
        eprintln!("{} {}", "Resolving target table:".cyan(), target);
    }
    let resolved_target = resolve_table(catalog, &target_choices).await;
    if resolved_target.is_none() {
        eprintln!(
            "{}",
            "Error loading Target Table. Please select a valid (non-empty) schema/table combination."
                .red()
        );
    }

    let warehouse = catalog.warehouse();
    let classifier = DiffClassifier::new(
        Arc::new(SqlDiffEngine::new(Arc::clone(&warehouse))),
        warehouse,
    );

    let outcome = match classifier
        .run(resolved_source.as_ref(), resolved_target.as_ref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!(
                "{}",
                "Error calculating table differences. Please check your selections and try again."
                    .red()
            );
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    // run() succeeding implies both sides resolved
    if let Some(resolved) = &resolved_source {
        print_summary(&outcome, &resolved.key_column);
    }
    write_artifacts(&outcome, output_dir)?;

    Ok(())
}

fn print_summary(outcome: &DiffOutcome, source_key: &str) {
    let summary = &outcome.summary;

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Table Diff Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {}", "Source:".bold(), summary.source.green());
    println!("{} {}", "Target:".bold(), summary.target.green());
    println!(
        "{} {}",
        "Materialized:".bold(),
        summary.materialized_table
    );
    println!();

    let missing_in_target = summary.missing_in_target.to_string();
    let missing_in_source = summary.missing_in_source.to_string();
    let value_mismatch = summary.value_mismatch.to_string();

    println!("{}", "Summary:".bold());
    println!(
        "  {}: {}",
        DiffBucket::MissingInTarget.label(),
        if summary.missing_in_target > 0 {
            missing_in_target.red().bold()
        } else {
            missing_in_target.green()
        }
    );
    println!(
        "  {}: {}",
        DiffBucket::MissingInSource.label(),
        if summary.missing_in_source > 0 {
            missing_in_source.red().bold()
        } else {
            missing_in_source.green()
        }
    );
    println!(
        "  {}: {}",
        DiffBucket::ValueMismatch.label(),
        if summary.value_mismatch > 0 {
            value_mismatch.yellow().bold()
        } else {
            value_mismatch.green()
        }
    );
    println!();

    if summary.is_clean() {
        println!("{}", "✓ Tables match!".green().bold());
    } else {
        // Key previews mirror the per-bucket key columns: source-side
        // key for rows the target lacks, target-side key otherwise
        print_key_preview(
            outcome,
            DiffBucket::MissingInTarget,
            &format!("{}_a", source_key.to_lowercase()),
        );
        print_key_preview(
            outcome,
            DiffBucket::MissingInSource,
            &format!("{}_b", source_key.to_lowercase()),
        );
        print_key_preview(
            outcome,
            DiffBucket::ValueMismatch,
            &format!("{}_a", source_key.to_lowercase()),
        );
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_key_preview(outcome: &DiffOutcome, bucket: DiffBucket, key_column: &str) {
    let set = outcome.classification.bucket(bucket);
    if set.is_empty() {
        return;
    }

    println!("{}", format!("{}:", bucket.label()).bold());
    if let Some(keys) = set.column_values(key_column) {
        for key in keys.iter().take(20) {
            println!("  {}", key);
        }
        if keys.len() > 20 {
            println!("  ... and {} more", keys.len() - 20);
        }
    }
    println!();
}

fn write_artifacts(outcome: &DiffOutcome, output_dir: &std::path::Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    for artifact in &outcome.artifacts {
        let path = output_dir.join(artifact.bucket.csv_file_name());
        std::fs::write(&path, &artifact.csv)?;
        println!(
            "{} {} ({} rows)",
            "Wrote".green(),
            path.display(),
            artifact.count
        );
    }

    let summary_path = output_dir.join("summary.json");
    outcome.summary.save_to_file(&summary_path)?;
    println!("{} {}", "Wrote".green(), summary_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
