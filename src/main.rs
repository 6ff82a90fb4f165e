//! CLI entry point for mapevent
//!
//! `check` lints a catalog file, `play` walks a map in the terminal.

use mapevent::EngineConfig;
use mapevent::cli::play::PlayOptions;
use std::fs;
use std::path::PathBuf;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "check" => {
            let file_path = require_path(&args);
            let json = read_catalog(&file_path);
            match mapevent::cli::check::run_check(&json) {
                Ok(result) if result.has_errors() => process::exit(2),
                Ok(_) => {}
                Err(err) => {
                    eprintln!("Error: Failed to check '{}'", file_path.display());
                    eprintln!("Reason: {}", err);
                    process::exit(1);
                }
            }
        }
        "play" => {
            let file_path = require_path(&args);
            let options = match parse_play_options(&args[3..]) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("Error: {}", message);
                    eprintln!();
                    print_usage();
                    process::exit(1);
                }
            };
            let json = read_catalog(&file_path);
            if let Err(err) = mapevent::cli::play::run_play(&json, options) {
                eprintln!("Error: Player mode failed");
                eprintln!("Reason: {}", err);
                process::exit(1);
            }
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("mapevent - Map event scripting engine");
    println!();
    println!("USAGE:");
    println!("    mapevent check <catalog.json>");
    println!("    mapevent play <catalog.json> [--debug] [--at X,Y] [--seed N] [--config FILE]");
    println!();
    println!("COMMANDS:");
    println!("    check <file>             Lint a catalog; exits with 2 on errors");
    println!("    play <file>              Walk the map in the terminal");
    println!("    --help, -h               Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --debug      Log engine activity and show switches/variables");
    println!("    --at X,Y     Starting tile of the player (default 0,0)");
    println!("    --seed N     Seed for random variable operands");
    println!("    --config F   Engine configuration (JSON)");
}

fn require_path(args: &[String]) -> PathBuf {
    match args.get(2) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Error: Missing catalog file path");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    }
}

fn read_catalog(file_path: &PathBuf) -> String {
    match fs::read_to_string(file_path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error: Failed to read file '{}'", file_path.display());
            eprintln!("Reason: {}", err);
            process::exit(1);
        }
    }
}

fn parse_play_options(args: &[String]) -> Result<PlayOptions, String> {
    let mut options = PlayOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" => options.debug = true,
            "--at" => {
                let value = iter.next().ok_or("--at needs X,Y")?;
                let (x, y) = value.split_once(',').ok_or("--at needs X,Y")?;
                let x = x.trim().parse().map_err(|_| format!("bad x in '{}'", value))?;
                let y = y.trim().parse().map_err(|_| format!("bad y in '{}'", value))?;
                options.start = (x, y);
            }
            "--config" => {
                let path = iter.next().ok_or("--config needs a file")?;
                let seed = options.config.rng_seed;
                options.config = EngineConfig::from_file(path).map_err(|e| format!("{:#}", e))?;
                options.config.rng_seed = seed.or(options.config.rng_seed);
            }
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a number")?;
                let seed = value.parse().map_err(|_| format!("bad seed '{}'", value))?;
                options.config.rng_seed = Some(seed);
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }
    Ok(options)
}
