use anyhow::{Context, Result};
use std::io::Read;
use std::{env, fs, io, process};

/// Reads a document description (simplified block JSON, a structured
/// tree, markdown, or plain text) from a file or stdin, normalizes it,
/// and prints the resulting editor document as JSON.
fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let content = match args.len() {
        1 => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
        2 if args[1] != "--help" => fs::read_to_string(&args[1])
            .with_context(|| format!("failed to read {}", args[1]))?,
        _ => {
            eprintln!("Usage: {} [input-file]", args[0]);
            eprintln!("With no input file, reads from stdin.");
            process::exit(1);
        }
    };

    let tree = taskdown_engine::normalize_str(&content);
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
