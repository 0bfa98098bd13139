use clap::Parser;

use drivectl::cli;
use drivectl::error::Result;
use drivectl::drive::DriveClient;

use drivectl::cli::Args;
use drivectl::config::load_drive_config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_drive_config()?;
    let client = DriveClient::new(config).await?;
    cli::run(args, client).await?;
    Ok(())
}
