use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use supplier_rank::config::Config;
use supplier_rank::optimize::{build_strategy, rank_suppliers, RankOutcome};
use supplier_rank::output::{self, ScoredSupplier};
use supplier_rank::scoring::ScoreError;
use supplier_rank::supplier::{SupplierPatch, SupplierRecord, SupplierStore};

const EXIT_SUCCESS: i32 = 0;
const EXIT_VALIDATION: i32 = 1;
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank stored suppliers (default if no subcommand)
    Rank {
        /// Show only the first N ranked suppliers
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Explain the score of every selected supplier
        #[arg(short, long)]
        explain: bool,

        /// Print the per-metric distribution of the ranked set
        #[arg(long)]
        stats: bool,

        /// Do not record this run in history
        #[arg(long)]
        no_record: bool,

        /// Description stored with the run
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List stored suppliers
    List,
    /// Add a supplier to the store
    Add {
        name: String,
        #[arg(long)]
        cost: f64,
        /// CO2 emissions in kg
        #[arg(long)]
        co2: f64,
        /// Delivery time in days
        #[arg(long)]
        delivery_time: u32,
        /// Ethical score, 0-100
        #[arg(long)]
        ethical_score: f64,
    },
    /// Change fields of a stored supplier
    Update {
        /// Supplier id, as shown by `list`
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        co2: Option<f64>,
        #[arg(long)]
        delivery_time: Option<u32>,
        #[arg(long)]
        ethical_score: Option<f64>,
    },
    /// Remove a stored supplier
    Remove {
        /// Supplier id, as shown by `list`
        id: u64,
    },
    /// Generate random suppliers within the configured field ranges
    Sample {
        /// Number of suppliers to generate
        #[arg(default_value_t = 10)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Replace the stored suppliers instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Show recorded ranking runs
    History {
        /// Number of runs to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Only runs newer than this (e.g. "7d", "12h")
        #[arg(long)]
        since: Option<String>,

        /// Show selected-supplier means per run, oldest first
        #[arg(long)]
        trends: bool,

        /// Show the full ranking of one run
        #[arg(long)]
        show: Option<u64>,

        /// Delete all recorded runs
        #[arg(long)]
        clear: bool,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "supplier-rank")]
#[command(about = "Multi-criteria supplier ranking CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/supplier-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// RUST_LOG wins; otherwise --verbose selects debug, default warn
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn exit_with(code: i32, prefix: &str, err: &anyhow::Error) -> ! {
    eprintln!("{}: {:#}", prefix, err);
    std::process::exit(code);
}

fn load_store_or_exit(config: &Config) -> (PathBuf, SupplierStore) {
    let path = config.store_path();
    match supplier_rank::supplier::load_store(&path) {
        Ok(store) => (path, store),
        Err(e) => exit_with(EXIT_STORAGE, "Storage error", &e),
    }
}

fn save_store_or_exit(path: &Path, store: &SupplierStore) {
    if let Err(e) = supplier_rank::supplier::save_store(path, store) {
        exit_with(EXIT_STORAGE, "Storage error", &e);
    }
}

fn validation_failure(err: ScoreError) -> ! {
    eprintln!("Invalid supplier data: {}", err);
    std::process::exit(EXIT_VALIDATION);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Rank {
        top: None,
        format: OutputFormat::Table,
        explain: false,
        stats: false,
        no_record: false,
        description: None,
    });
    let config_path = cli.config.map(PathBuf::from);

    // The wizard runs before config loading so a broken config can be replaced
    if let Commands::Init = command {
        if let Err(e) = supplier_rank::config::init::run_init_wizard(config_path) {
            exit_with(EXIT_CONFIG, "Init failed", &e);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match supplier_rank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, "Config error", &e),
    };

    // Validate config at startup
    if let Err(errors) = supplier_rank::scoring::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = output::should_use_colors();

    match command {
        Commands::Rank {
            top,
            format,
            explain,
            stats,
            no_record,
            description,
        } => run_rank(
            &config,
            RankOptions {
                top,
                format,
                explain,
                stats,
                record: !no_record,
                description,
            },
            use_colors,
        ),
        Commands::List => {
            let (_, store) = load_store_or_exit(&config);
            println!("{}", output::format_supplier_list(store.records(), use_colors));
        }
        Commands::Add {
            name,
            cost,
            co2,
            delivery_time,
            ethical_score,
        } => {
            let (path, mut store) = load_store_or_exit(&config);
            let record = SupplierRecord::new(name, cost, co2, delivery_time, ethical_score);
            let id = match store.add(record, &config.effective_domains()) {
                Ok(id) => id,
                Err(e) => validation_failure(e),
            };
            save_store_or_exit(&path, &store);
            if let Some(added) = store.get(id) {
                println!("Added {}", output::format_supplier_detail(added, use_colors));
            }
        }
        Commands::Update {
            id,
            name,
            cost,
            co2,
            delivery_time,
            ethical_score,
        } => {
            let patch = SupplierPatch {
                name,
                cost,
                co2,
                delivery_time,
                ethical_score,
            };
            if patch.is_empty() {
                eprintln!("Nothing to update. Pass at least one of --name, --cost, --co2, --delivery-time, --ethical-score.");
                std::process::exit(EXIT_VALIDATION);
            }
            let (path, mut store) = load_store_or_exit(&config);
            let detail = match store.update(id, &patch, &config.effective_domains()) {
                Ok(Some(updated)) => output::format_supplier_detail(updated, use_colors),
                Ok(None) => {
                    eprintln!("No supplier with id {}.", id);
                    std::process::exit(EXIT_VALIDATION);
                }
                Err(e) => validation_failure(e),
            };
            save_store_or_exit(&path, &store);
            println!("Updated {}", detail);
        }
        Commands::Remove { id } => {
            let (path, mut store) = load_store_or_exit(&config);
            if !store.remove(id) {
                eprintln!("No supplier with id {}.", id);
                std::process::exit(EXIT_VALIDATION);
            }
            save_store_or_exit(&path, &store);
            println!("Removed supplier #{}", id);
        }
        Commands::Sample {
            count,
            seed,
            replace,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let domains = config.effective_domains();
            let generated = supplier_rank::sample::generate_suppliers(count, &domains, &mut rng);
            let (path, mut store) = load_store_or_exit(&config);
            if replace {
                if let Err(e) = store.replace_all(generated, &domains) {
                    validation_failure(e);
                }
            } else {
                for record in generated {
                    if let Err(e) = store.add(record, &domains) {
                        validation_failure(e);
                    }
                }
            }
            save_store_or_exit(&path, &store);
            println!(
                "Generated {} suppliers ({} stored)",
                count,
                store.len()
            );
        }
        Commands::History {
            limit,
            since,
            trends,
            show,
            clear,
        } => run_history(&config, limit, since, trends, show, clear, use_colors),
        // Handled before config loading
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

struct RankOptions {
    top: Option<usize>,
    format: OutputFormat,
    explain: bool,
    stats: bool,
    record: bool,
    description: Option<String>,
}

fn run_rank(config: &Config, options: RankOptions, use_colors: bool) {
    let start_time = Instant::now();
    let (_, store) = load_store_or_exit(config);

    let strategy = match build_strategy(&config.effective_strategy(), &config.effective_weights()) {
        Ok(s) => s,
        Err(e) => exit_with(EXIT_CONFIG, "Config error", &e),
    };

    let outcome = match rank_suppliers(store.records(), strategy.as_ref(), config) {
        Ok(o) => o,
        Err(e) => match e.downcast_ref::<ScoreError>() {
            Some(ScoreError::EmptyBatch) => {
                eprintln!("No suppliers to rank.");
                eprintln!("Add suppliers with `supplier-rank add` or generate some with `supplier-rank sample`.");
                std::process::exit(EXIT_VALIDATION);
            }
            Some(_) => exit_with(EXIT_VALIDATION, "Invalid supplier data", &e),
            None => exit_with(EXIT_STORAGE, "Ranking failed", &e),
        },
    };

    debug!(
        ranked = outcome.ranked.len(),
        excluded = outcome.excluded.len(),
        elapsed = ?start_time.elapsed(),
        "ranking complete"
    );

    let limit = options.top.unwrap_or(outcome.ranked.len());
    print_outcome(&outcome, &options, limit, use_colors);

    if options.record {
        if let Err(e) = record_run(config, &outcome, options.description) {
            exit_with(EXIT_STORAGE, "Storage error", &e);
        }
    }
}

fn print_outcome(outcome: &RankOutcome, options: &RankOptions, limit: usize, use_colors: bool) {
    let rows: Vec<ScoredSupplier> = ScoredSupplier::from_outcome(outcome)
        .into_iter()
        .take(limit)
        .collect();

    match options.format {
        OutputFormat::Json => match output::format_json(outcome, limit) {
            Ok(json) => println!("{}", json),
            Err(e) => exit_with(
                EXIT_STORAGE,
                "Failed to serialize ranking",
                &anyhow::Error::from(e),
            ),
        },
        OutputFormat::Tsv => println!("{}", output::format_tsv(&rows)),
        OutputFormat::Table => {
            println!("{}", output::format_scored_table(&rows, use_colors));
            if let Some(summary) = &outcome.summary {
                println!();
                println!("{}", output::format_selection_summary(summary));
            }
            if !outcome.excluded.is_empty() {
                println!("Excluded by pattern: {}", outcome.excluded.len());
            }
        }
    }

    // Analysis views are table-only
    if options.format != OutputFormat::Table {
        return;
    }
    if options.explain {
        for result in outcome.selected_results() {
            println!();
            println!(
                "{}",
                output::format_explain(result, &outcome.ranked, use_colors)
            );
        }
    }
    if options.stats {
        if let Some(distribution) =
            supplier_rank::scoring::analysis::distribution(&outcome.ranked)
        {
            println!();
            println!("{}", output::format_distribution(&distribution));
        }
    }
}

fn record_run(
    config: &Config,
    outcome: &RankOutcome,
    description: Option<String>,
) -> anyhow::Result<()> {
    let path = config.history_path();
    let mut history = supplier_rank::history::load_history(&path)?;
    let run_id = history
        .record(outcome.to_new_run(description), config.history_cap())
        .id;
    supplier_rank::history::save_history(&path, &history)
        .with_context(|| format!("Failed to record run #{}", run_id))?;
    debug!(run_id, path = %path.display(), "recorded run");
    Ok(())
}

fn run_history(
    config: &Config,
    limit: usize,
    since: Option<String>,
    trends: bool,
    show: Option<u64>,
    clear: bool,
    use_colors: bool,
) {
    let path = config.history_path();
    let mut history = match supplier_rank::history::load_history(&path) {
        Ok(h) => h,
        Err(e) => exit_with(EXIT_STORAGE, "Storage error", &e),
    };

    if clear {
        let removed = history.clear();
        if let Err(e) = supplier_rank::history::save_history(&path, &history) {
            exit_with(EXIT_STORAGE, "Storage error", &e);
        }
        println!("Cleared {} runs", removed);
        return;
    }

    if let Some(id) = show {
        match history.get(id) {
            Some(run) => println!("{}", output::format_run_detail(run, use_colors)),
            None => {
                eprintln!("No run with id {}.", id);
                std::process::exit(EXIT_VALIDATION);
            }
        }
        return;
    }

    if trends {
        println!("{}", output::format_trends(&history.trends(limit)));
        return;
    }

    let runs = match since {
        Some(text) => {
            let window = humantime::parse_duration(&text)
                .map_err(anyhow::Error::from)
                .and_then(|d| chrono::Duration::from_std(d).map_err(anyhow::Error::from))
                .with_context(|| format!("Invalid --since duration '{}'", text));
            match window {
                Ok(window) => history.since(window).into_iter().take(limit).collect(),
                Err(e) => exit_with(EXIT_VALIDATION, "Invalid argument", &e),
            }
        }
        None => history.recent(limit),
    };
    println!("{}", output::format_history_list(&runs, use_colors));
}
