use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

use recipe_search::cli::{parse_args, Cli};
use recipe_search::display::{render_json, render_results, EMPTY_QUERY_MESSAGE};
use recipe_search::search::{normalize_text, IndexCache, QueryFilters, SearchIndex};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_query(index: &SearchIndex, query: &str, filters: &QueryFilters, json: bool) -> Result<()> {
    if normalize_text(query).is_empty() {
        if json {
            println!("[]");
        } else {
            println!("{}", EMPTY_QUERY_MESSAGE);
        }
        return Ok(());
    }

    let results = index.search(query, filters);
    if json {
        println!("{}", render_json(&results).context("Failed to serialize results")?);
    } else {
        print!("{}", render_results(&results, query));
    }
    Ok(())
}

fn interactive(index: &SearchIndex, cli: &Cli, filters: &QueryFilters) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if !cli.json {
        eprintln!("Enter ingredients, one query per line (Ctrl-D to quit).");
    }
    loop {
        if !cli.json {
            eprint!("> ");
        }
        stdout.flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read query from stdin")?;
        if read == 0 {
            break;
        }
        run_query(index, line.trim(), filters, cli.json)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = parse_args();
    let filters = cli.filters();
    let options = cli.loader_options();

    if !cli.json {
        eprintln!("Loading recipes from {} ...", cli.data.display());
    }
    let index = IndexCache::global()
        .get_or_load(&cli.data, &options)
        .with_context(|| format!("Failed to load recipe data from '{}'", cli.data.display()))?;
    if !cli.json {
        eprintln!(
            "Loaded {} recipes ({} indexed terms).",
            index.corpus().len(),
            index.vector_space().vocabulary_size()
        );
    }

    match cli.query.as_deref() {
        Some(query) => run_query(&index, query, &filters, cli.json),
        None => interactive(&index, &cli, &filters),
    }
}
