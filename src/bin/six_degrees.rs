//! six-degrees - interactive actor connection finder
//!
//! `<data-dir>` must contain `actordata` and `moviedata`. The program asks
//! for two actors, prints the shortest connection it can find, and repeats
//! until an empty line is entered.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use six_degrees::{
    CreditIndex, ImdbStore, Search, SearchConfig, SearchOutcome, DEFAULT_MAX_ROUNDS,
};

#[derive(Parser, Debug)]
#[command(version, about = "Connect two actors through the films they shared")]
struct Args {
    /// Directory containing actordata and moviedata
    data_dir: PathBuf,

    /// Search rounds before giving up; each round adds up to two hops
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Print paths as JSON
    #[arg(long)]
    json: bool,
}

/// Ask for an actor until one the index knows is given. `None` on an empty
/// line or end of input.
fn prompt_for_actor<I: CreditIndex + ?Sized>(
    prompt: &str,
    index: &I,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<Option<String>> {
    loop {
        write!(out, "{} [or <enter> to quit]: ", prompt)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let response = line.trim_end_matches(&['\n', '\r'][..]);
        if response.is_empty() {
            return Ok(None);
        }
        if index.contains_actor(response)? {
            return Ok(Some(response.to_string()));
        }
        writeln!(
            out,
            "We couldn't find \"{}\" in the movie database. Please try again.",
            response
        )?;
    }
}

fn report(
    source: &str,
    target: &str,
    outcome: &SearchOutcome,
    as_json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if as_json {
        let value = match outcome {
            SearchOutcome::Found(path) => json!({
                "source": source,
                "target": target,
                "found": true,
                "hops": path.len(),
                "path": path,
            }),
            SearchOutcome::Exhausted => json!({
                "source": source,
                "target": target,
                "found": false,
            }),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    match outcome {
        SearchOutcome::Found(path) => writeln!(out, "{}", path)?,
        SearchOutcome::Exhausted => {
            writeln!(out)?;
            writeln!(out, "No path between those two people could be found.")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn run<I: CreditIndex + ?Sized>(
    index: &I,
    config: SearchConfig,
    as_json: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    loop {
        let Some(source) = prompt_for_actor("Actor or actress", index, input, out)? else {
            break;
        };
        let Some(target) = prompt_for_actor("Another actor or actress", index, input, out)? else {
            break;
        };
        if source == target {
            writeln!(
                out,
                "Good one.  This is only interesting if you specify two different people."
            )?;
            continue;
        }

        let mut search = Search::new(index, config);
        let outcome = search
            .run(&source, &target)
            .with_context(|| format!("searching {} -> {}", source, target))?;
        tracing::info!(stats = ?search.stats(), "search finished");
        report(&source, &target, &outcome, as_json, out)?;
    }

    writeln!(out, "Thanks for playing!")?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = SearchConfig::default().with_max_rounds(args.max_rounds);

    let store = match ImdbStore::open(&args.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to properly initialize the imdb database.");
            eprintln!("Please check to make sure the source files exist and that you have permission to read them.");
            eprintln!("({})", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = run(&store, config, args.json, &mut stdin.lock(), &mut stdout.lock());
    drop(store);
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
