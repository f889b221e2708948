use clap::Parser;
use fusion_chain::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Chain(args) => cli::chain::run(args).await,
        Command::Fuse(args) => cli::fuse::run(args).await,
    }
}
