//! blobstage CLI - resolve and inspect blob-stored content.

use std::env;
use std::time::Duration;

use blobstage::prelude::*;
use blobstage::unity;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity: u8 = 0;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = 1,
            "-vv" | "--trace" => verbosity = 2,
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Resolve command - fetch a blob and classify it
        "resolve" | "r" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing blob id argument");
                eprintln!("Usage: blobstage resolve <blob-id> [--aggregator URL]");
                std::process::exit(1);
            }
            let aggregator = flag_value(&filtered_args, "--aggregator");
            cmd_resolve(filtered_args[1], aggregator);
        }

        // Probe command - classify a local file without fetching
        "probe" | "p" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: blobstage probe <file>");
                std::process::exit(1);
            }
            cmd_probe(filtered_args[1]);
        }

        "help" | "-h" | "--help" => print_help(),

        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
    }
}

fn flag_value<'a>(args: &[&'a str], flag: &str) -> Option<&'a str> {
    args.iter().position(|&a| a == flag).and_then(|i| args.get(i + 1).copied())
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "blobstage=warn",
        1 => "blobstage=debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("blobstage - resolve and inspect blob-stored content");
    println!();
    println!("Usage: blobstage [flags] <command> [args]");
    println!();
    println!("Commands:");
    println!("  resolve, r <blob-id> [--aggregator URL]   Fetch a blob and classify it");
    println!("  probe,   p <file>                         Classify a local file's bytes");
    println!("  help                                      Show this help");
    println!();
    println!("Flags:");
    println!("  -v, --verbose    Debug logging");
    println!("  -vv, --trace     Trace logging");
}

fn cmd_resolve(blob_id: &str, aggregator: Option<&str>) {
    let mut settings = Settings::default();
    if let Some(url) = aggregator {
        settings.aggregator_base_url = url.to_string();
    }

    let id = match ContentId::new(blob_id) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let fetcher = match HttpFetcher::from_settings(&settings) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let registry = UrlRegistry::new();
    match resolve(&fetcher, &registry, &id) {
        Ok(classification) => print_classification(&classification),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_probe(path: &str) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    match unity::archive::probe(&bytes) {
        unity::Probe::Package(names) => {
            println!("Packaged build ({} bytes):", bytes.len());
            for (slot, name) in names.iter() {
                println!("  {:<10} {}  [{}]", slot, name, unity::entry_type(name));
            }
        }
        unity::Probe::Incomplete => {
            println!("Archive, but not a complete build; would fall back to image display");
        }
        unity::Probe::NotAnArchive => {
            println!("Not an archive; would display as image ({} bytes)", bytes.len());
        }
    }
}

fn print_classification(classification: &Classification) {
    match classification {
        Classification::Game(assets) => {
            println!("Classification: game");
            for (slot, handle) in assets.iter() {
                println!(
                    "  {:<10} {:>9} bytes  {}  [{}]",
                    slot,
                    handle.len(),
                    handle.url(),
                    handle.content_type()
                );
            }
        }
        Classification::Image(handle) => {
            println!("Classification: image");
            println!(
                "  {:>9} bytes  {}  [{}]",
                handle.len(),
                handle.url(),
                handle.content_type()
            );
        }
        Classification::Unrecognized => {
            println!("Classification: unrecognized");
        }
    }
}
