//! Cache memory hierarchy simulator CLI.
//!
//! This binary replays an access trace against a configured hierarchy. It performs:
//! 1. **Configuration:** Loads a JSON config and/or builds cache levels from `--cache` tokens.
//! 2. **Replay:** Parses the trace and issues every fetch, load and store through a `Session`.
//! 3. **Reporting:** Prints statistics as text sections or JSON, and optionally the final line
//!    state of every cache level.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::{EnvFilter, fmt};

use memsim_core::Session;
use memsim_core::config::{CacheConfig, Config};
use memsim_core::sim::{TraceEvent, parse_trace};
use memsim_core::soc::MemoryComponent;
use memsim_core::stats::STATS_SECTIONS;

#[derive(Parser, Debug)]
#[command(
    name = "memsim",
    author,
    version,
    about = "Cache memory hierarchy simulator",
    long_about = "Replay a fetch/load/store trace against a flat memory or a stack of caches.\n\nTrace lines: `F <addr>`, `R <addr>`, `W <addr> <value>`; `#` starts a comment.\n\nExamples:\n  memsim trace.txt --cache FA 64 16 WB LRU --stats\n  memsim trace.txt --cache SA 1024 16 WT_NO RAND 4 --cache SA 8192 32 WB LRU 8 --json\n  memsim trace.txt --config hierarchy.json --flush --dump-lines"
)]
struct Cli {
    /// Trace file to replay (`-` reads stdin).
    trace: PathBuf,

    /// Cache level as `TYPE SIZE LINE WRITE REPLACE [WAYS]` (e.g. `SA 1024 16 WB LRU 4`).
    /// Repeat for deeper levels, L1 first. Replaces the levels of `--config`.
    #[arg(long = "cache", value_name = "SPEC", num_args = 5..=6, action = ArgAction::Append)]
    caches: Vec<String>,

    /// JSON hierarchy configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backing memory size in bytes.
    #[arg(long, value_name = "BYTES")]
    memory_size: Option<usize>,

    /// Print statistics; optionally only the named sections.
    #[arg(long, value_name = "SECTION", num_args = 0..)]
    stats: Option<Vec<String>>,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Print every access that reaches the backing memory.
    #[arg(long)]
    output: bool,

    /// Write dirty lines back to memory after the replay.
    #[arg(long)]
    flush: bool,

    /// Print the final state of every cache line.
    #[arg(long)]
    dump_lines: bool,
}

fn main() {
    fmt::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .compact()
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let levels = cache_levels(&matches);

    let config = load_config(&cli, &levels).unwrap_or_else(|e| fail(&e));
    let events = load_trace(&cli.trace).unwrap_or_else(|e| fail(&e));

    let mut session =
        Session::new(&config).unwrap_or_else(|e| fail(&format!("configuration error: {e}")));
    if cli.output {
        attach_output_hooks(&mut session);
    }

    let result = session.run(events);

    if cli.flush {
        if let Err(fault) = session.finish() {
            fail(&format!("flush failed: {fault}"));
        }
    }

    if cli.dump_lines {
        dump_lines(session.hierarchy());
    }

    if cli.json {
        match serde_json::to_string_pretty(session.stats()) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(&format!("failed to encode statistics: {e}")),
        }
    } else if let Some(sections) = &cli.stats {
        session.stats().print_sections(sections);
    }

    if let Err(fault) = result {
        fail(&format!("simulation fault: {fault}"));
    }
}

/// Groups the `--cache` values by occurrence, one token list per level.
fn cache_levels(matches: &ArgMatches) -> Vec<Vec<String>> {
    matches
        .get_occurrences::<String>("caches")
        .map(|levels| levels.map(|tokens| tokens.cloned().collect()).collect())
        .unwrap_or_default()
}

/// Builds the configuration from `--config`, then applies `--cache` and `--memory-size`.
fn load_config(cli: &Cli, levels: &[Vec<String>]) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).map_err(|e| format!("{}: {e}", path.display()))?,
        None => Config::default(),
    };

    if !cli.caches.is_empty() {
        config.caches = levels
            .iter()
            .map(|tokens| CacheConfig::from_args(tokens.as_slice()))
            .collect::<Result<_, _>>()
            .map_err(|e| format!("configuration error: {e}"))?;
    }
    if let Some(size) = cli.memory_size {
        config.memory.size_bytes = size;
    }

    if let Some(sections) = &cli.stats {
        if let Some(bad) = sections.iter().find(|s| !STATS_SECTIONS.contains(&s.as_str())) {
            return Err(format!(
                "unknown stats section `{bad}` (expected one of: {})",
                STATS_SECTIONS.join(", ")
            ));
        }
    }

    config.validate().map_err(|e| format!("configuration error: {e}"))?;
    Ok(config)
}

fn load_trace(path: &Path) -> Result<Vec<TraceEvent>, String> {
    let events = if path.as_os_str() == "-" {
        parse_trace(io::stdin().lock())
    } else {
        let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
        parse_trace(BufReader::new(file))
    };
    events.map_err(|e| format!("{}: {e}", path.display()))
}

/// Prints `ReadMem`/`WriteMem` lines for every access that reaches the backing memory.
fn attach_output_hooks(session: &mut Session) {
    if let Some(memory) = session.memory_mut() {
        memory.set_on_read(Some(Box::new(|addr: u32, value: i32| {
            println!("ReadMem 0x{addr:08X} 0x{value:08X}");
        })));
        memory.set_on_write(Some(Box::new(|addr: u32, value: i32| {
            println!("WriteMem 0x{addr:08X} 0x{value:08X}");
        })));
    }
}

fn dump_lines(top: &dyn MemoryComponent) {
    let mut level = Some(top);
    while let Some(component) = level {
        let lines = component.line_states();
        if !lines.is_empty() {
            println!("--- {} ---", component.name());
            println!("{:>6} {:>5} {:>5} {:>5} {:>10}", "set", "way", "valid", "dirty", "tag");
            for line in lines {
                println!(
                    "{:>6} {:>5} {:>5} {:>5} {:>#10x}",
                    line.set, line.way, line.valid, line.dirty, line.tag
                );
            }
        }
        level = component.next_level();
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}
