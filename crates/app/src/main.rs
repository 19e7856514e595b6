// CLI modules
mod args;
mod config;
mod op;
mod ops;

use clap::Parser;

use args::{Args, Command};
use op::{Op, OpContext};

fn run<O: Op>(op: &O, ctx: &OpContext) -> Result<String, anyhow::Error> {
    let output = op.execute(ctx)?;
    Ok(output.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let ctx = match OpContext::new(args.config_path.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let result = match &args.command {
        Command::Message(op) => run(op, &ctx),
        Command::Keygen(op) => run(op, &ctx),
        Command::Encrypt(op) => run(op, &ctx),
        Command::Decrypt(op) => run(op, &ctx),
        Command::Grant(op) => run(op, &ctx),
        Command::OpenGrant(op) => run(op, &ctx),
        Command::Epoch(op) => run(op, &ctx),
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
