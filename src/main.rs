use clap::Parser;
use esg_analytics::app::{handle_fatal_error, initialize_app, AppConfig};
use esg_analytics::cli::{execute_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let app_config = AppConfig::new(verbose).with_config_path(cli.config.clone());

    let result = async {
        let config = initialize_app(app_config).await?;
        execute_command(cli.command, config).await
    }
    .await;

    if let Err(e) = result {
        handle_fatal_error(e, verbose);
    }
}
