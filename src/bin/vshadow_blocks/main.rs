use anyhow::Result;
use clap::Parser;

mod cli;
mod util;
mod cmd_decode;
mod cmd_scan;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Decode { hex, file, offset, json } =>
            cmd_decode::exec(hex, file, offset, json),

        cli::Cmd::Scan { file, offset, count, order, block_size, json } =>
            cmd_scan::exec(file, offset, count, order, block_size, json),
    }
}
