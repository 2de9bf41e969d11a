mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use kerb_core::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "kerbside=trace,kerb_server=trace,kerb_db=debug,kerb_core=debug,tower_http=debug"
                .to_string()
        } else {
            "kerbside=debug,kerb_server=debug,kerb_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            config.server.host = host;
            config.server.port = port;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(kerb_server::start(config))?;
            Ok(())
        }
        Commands::CheckConfig => {
            let config = Config::load_or_default(cli.config.as_deref());
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration OK");
            } else {
                for warning in &warnings {
                    println!("warning: {warning}");
                }
            }
            Ok(())
        }
    }
}
