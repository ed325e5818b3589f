use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;

use regexgen::Pattern;

/// Generate random strings matching a restricted regular expression.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The pattern to generate strings from
    pattern: String,

    /// Number of strings to generate
    #[arg(short = 'n', long = "count", default_value_t = 10)]
    count: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let pattern = Pattern::compile(&args.pattern)
        .with_context(|| format!("cannot compile pattern {:?}", args.pattern))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut rng = rand::thread_rng();
    for _ in 0..args.count {
        writeln!(out, "{}", pattern.generate_with(&mut rng))?;
    }
    Ok(())
}
