use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use dicty_mutants::cache::SnapshotCache;
use dicty_mutants::error::DictyError;
use dicty_mutants::source::{Category, DictybaseHttpClient};
use dicty_mutants::store::MutantStore;

#[derive(Parser)]
#[command(name = "dicty-mutants")]
#[command(about = "Query curated Dictyostelium discoideum mutants from dictyBase")]
#[command(version, author)]
struct Cli {
    /// Cache directory override (defaults to ~/.cache/dicty-mutants)
    #[arg(long, global = true)]
    cache_dir: Option<camino::Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Force a full re-download and rebuild of the snapshot")]
    Refresh,
    #[command(about = "Show one mutant record")]
    Show { id: String },
    #[command(about = "List mutant ids, optionally filtered by category")]
    Ids {
        #[arg(long)]
        category: Option<Category>,
    },
    #[command(about = "List every gene referenced by any mutant")]
    Genes,
    #[command(about = "List every phenotype referenced by any mutant")]
    Phenotypes,
    #[command(about = "List mutants annotated with a gene")]
    Gene { name: String },
    #[command(about = "List mutants exhibiting a phenotype")]
    Phenotype { name: String },
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(dicty) = report.downcast_ref::<DictyError>() {
            return ExitCode::from(map_exit_code(dicty));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &DictyError) -> u8 {
    match error {
        DictyError::UnknownMutant(_) => 2,
        DictyError::SourceUnavailable { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = match cli.cache_dir {
        Some(root) => SnapshotCache::new_with_root(root),
        None => SnapshotCache::new().into_diagnostic()?,
    };
    let client = DictybaseHttpClient::new().into_diagnostic()?;

    if let Commands::Refresh = cli.command {
        let bytes = cache.refresh(&client).into_diagnostic()?;
        cache.persist_snapshot(&bytes).into_diagnostic()?;
        let store = cache.load_snapshot(&client).into_diagnostic()?;
        return print_json(&RefreshSummary {
            mutants: store.len(),
            snapshot_path: cache.snapshot_path().to_string(),
        })
        .into_diagnostic();
    }

    let store = cache.load_snapshot(&client).into_diagnostic()?;
    run_query(cli.command, &store)
}

fn run_query(command: Commands, store: &MutantStore) -> miette::Result<()> {
    match command {
        Commands::Refresh => unreachable!("handled before the snapshot is loaded"),
        Commands::Show { id } => {
            let record = store.get(&id)?;
            print_json(record).into_diagnostic()?;
        }
        Commands::Ids { category } => {
            let ids: Vec<&str> = match category {
                Some(category) => store.in_category(category).collect(),
                None => store.ids().collect(),
            };
            print_json(&ids).into_diagnostic()?;
        }
        Commands::Genes => print_json(&store.all_genes()).into_diagnostic()?,
        Commands::Phenotypes => print_json(&store.all_phenotypes()).into_diagnostic()?,
        Commands::Gene { name } => {
            let index = store.gene_index();
            let ids: Vec<&str> = index
                .get(name.as_str())
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            print_json(&ids).into_diagnostic()?;
        }
        Commands::Phenotype { name } => {
            let index = store.phenotype_index();
            let ids: Vec<&str> = index
                .get(name.as_str())
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            print_json(&ids).into_diagnostic()?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RefreshSummary {
    mutants: usize,
    snapshot_path: String,
}

fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    let mut stdout = io::stdout();
    stdout.write_all(json.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
