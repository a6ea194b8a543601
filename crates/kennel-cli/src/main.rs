use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use kennel_core::{Database, Dog};
use kennel_server::config::DEFAULT_ADDR;
use kennel_server::{Environment, ServerConfig, TracerConfig};

#[derive(Parser)]
#[command(name = "kennel", version, about = "Serve the dogs table as a web page")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "KENNEL_DB", default_value = "kennel.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Revert the most recent migration
    Rollback,
    /// Show which migrations have been applied
    Status,
    /// List all dogs
    Dogs {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Insert a dog
    Add {
        name: String,
        breed: String,
        age: i64,
        /// Record the dog as not a good boy
        #[arg(long)]
        not_good: bool,
    },
    /// Delete a dog by ID
    Remove {
        id: i64,
    },
    /// Run the web server
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "KENNEL_ADDR", default_value = DEFAULT_ADDR)]
    addr: SocketAddr,
    /// development or production
    #[arg(long = "env", env = "KENNEL_ENV", default_value = "development", value_parser = parse_environment)]
    environment: Environment,
    /// Directory with index.html, re-read on every request in development
    #[arg(long, env = "KENNEL_VIEWS")]
    views: Option<PathBuf>,
    /// Service name attached to request spans
    #[arg(long, env = "KENNEL_SERVICE_NAME", default_value = "my-app")]
    service_name: String,
    /// Verbose tracing output
    #[arg(long, env = "KENNEL_TRACE_DEBUG", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    trace_debug: bool,
    /// Wrap requests in tracing spans
    #[arg(long, env = "KENNEL_TRACE_ENABLED", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    trace_enabled: bool,
}

fn parse_environment(s: &str) -> Result<Environment, String> {
    s.parse::<Environment>().map_err(|e| e.to_string())
}

impl ServeArgs {
    fn tracer(&self) -> TracerConfig {
        TracerConfig {
            service_name: self.service_name.clone(),
            debug: self.trace_debug,
            enabled: self.trace_enabled,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let tracer = match &cli.command {
        Commands::Serve(args) => args.tracer(),
        _ => TracerConfig {
            debug: false,
            ..TracerConfig::default()
        },
    };
    kennel_server::telemetry::init(&tracer);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Migrate => cmd_migrate(&cli.db),
        Commands::Rollback => cmd_rollback(&cli.db),
        Commands::Status => cmd_status(&cli.db),
        Commands::Dogs { json } => cmd_dogs(&cli.db, json),
        Commands::Add { name, breed, age, not_good } => {
            cmd_add(&cli.db, &name, &breed, age, !not_good)
        }
        Commands::Remove { id } => cmd_remove(&cli.db, id),
        Commands::Serve(args) => cmd_serve(cli.db, args),
    }
}

/// Open the database and refuse to continue if the schema is behind.
fn open_migrated(db_path: &Path) -> anyhow::Result<Database> {
    let db = Database::open(db_path)?;
    if !db.pending_migrations()?.is_empty() {
        bail!("Database has pending migrations. Run 'kennel migrate' first.");
    }
    Ok(db)
}

fn cmd_migrate(db_path: &Path) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let applied = db.migrate()?;

    if applied.is_empty() {
        println!("Schema is up to date.");
        return Ok(());
    }
    for m in applied {
        println!("Applied {}_{}", m.version, m.name);
    }
    Ok(())
}

fn cmd_rollback(db_path: &Path) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    match db.rollback()? {
        Some(m) => println!("Reverted {}_{}", m.version, m.name),
        None => println!("No migrations to revert."),
    }
    Ok(())
}

fn cmd_status(db_path: &Path) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let statuses = db.migration_status()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Status", "Version", "Name"]);

    for s in &statuses {
        table.add_row(vec![if s.applied { "up" } else { "down" }, s.version, s.name]);
    }

    println!("{table}");
    Ok(())
}

fn cmd_dogs(db_path: &Path, json: bool) -> anyhow::Result<()> {
    let db = open_migrated(db_path)?;
    let dogs = db.list_dogs()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dogs)?);
        return Ok(());
    }

    if dogs.is_empty() {
        println!("No dogs found. Run 'kennel add <name> <breed> <age>' first.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Breed", "Age", "Good boy"]);

    for d in &dogs {
        table.add_row(vec![
            d.id.map(|id| id.to_string()).unwrap_or_default(),
            d.display_name().to_string(),
            d.display_breed().to_string(),
            d.display_age(),
            d.display_good_boy().to_string(),
        ]);
    }

    println!("{table}");
    println!("{} dog(s)", db.count_dogs()?);
    Ok(())
}

fn cmd_remove(db_path: &Path, id: i64) -> anyhow::Result<()> {
    let db = open_migrated(db_path)?;
    let dog = db
        .get_dog(id)?
        .with_context(|| format!("Dog with id {} not found", id))?;

    db.delete_dog(id)?;
    tracing::debug!(id, "deleted dog");
    println!("Removed {} (id {})", dog.display_name(), id);
    Ok(())
}

fn cmd_add(db_path: &Path, name: &str, breed: &str, age: i64, is_good_boy: bool) -> anyhow::Result<()> {
    let db = open_migrated(db_path)?;
    let id = db.insert_dog(&Dog::new(name, breed, age, is_good_boy))?;
    tracing::debug!(id, name, "inserted dog");
    println!("Added {} (id {})", name, id);
    Ok(())
}

fn cmd_serve(db_path: PathBuf, args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        addr: args.addr,
        db_path,
        environment: args.environment,
        tracer: args.tracer(),
        views_dir: args.views,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(kennel_server::serve(config))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_args(extra: &[&str]) -> ServeArgs {
        let mut argv = vec!["kennel", "serve"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Serve(args) => args,
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_defaults() {
        let args = serve_args(&[]);
        assert_eq!(args.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(args.environment, Environment::Development);
        assert_eq!(args.tracer(), TracerConfig::default());
    }

    #[test]
    fn test_trace_flags_accept_boolish_values() {
        let args = serve_args(&["--trace-debug", "0", "--trace-enabled", "no"]);
        assert!(!args.trace_debug);
        assert!(!args.trace_enabled);

        let args = serve_args(&["--trace-debug", "1", "--trace-enabled", "on"]);
        assert!(args.trace_debug);
        assert!(args.trace_enabled);
    }

    #[test]
    fn test_trace_flags_reject_garbage() {
        assert!(Cli::try_parse_from(["kennel", "serve", "--trace-debug", "maybe"]).is_err());
    }

    #[test]
    fn test_remove_takes_id() {
        let cli = Cli::try_parse_from(["kennel", "remove", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { id: 3 }));
    }

    #[test]
    fn test_remove_missing_dog_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kennel.db");
        cmd_migrate(&path).unwrap();
        assert!(cmd_remove(&path, 42).is_err());

        cmd_add(&path, "Rex", "Lab", 3, true).unwrap();
        cmd_remove(&path, 1).unwrap();
        assert_eq!(Database::open(&path).unwrap().count_dogs().unwrap(), 0);
    }
}
