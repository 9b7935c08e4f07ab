use clap::Parser;
use tierwatch::adapter::inbound::cli::command::{CheckCommand, Cli, Commands};
use tierwatch::adapter::inbound::cli::{check, output, run};
use tierwatch::infrastructure::shutdown::install_rustls_provider;

#[tokio::main]
async fn main() {
    install_rustls_provider();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(arg.config.as_deref()),
        Commands::Check(CheckCommand::Connection(arg)) => {
            check::execute_connection(arg.config.as_deref()).await
        }
        Commands::Check(CheckCommand::Webhook(arg)) => {
            check::execute_webhook(arg.config.as_deref()).await
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
