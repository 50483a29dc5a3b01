use clap::Parser;
use olla_cli::{Cli, execute, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(err) = execute(cli).await {
        eprintln!("olla error: {err}");
        std::process::exit(1);
    }
}
