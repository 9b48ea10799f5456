use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zabfest::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zabfest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let token_file = cli.token_file.as_path();

    match cli.command {
        Commands::Init => cli::commands::init(cli.config.clone()).await,
        Commands::Serve { host, port, secret } => {
            cli::commands::serve(config, host, port, secret).await
        }
        Commands::HashPassword { password, cost } => {
            cli::commands::hash_password_cmd(config, password, cost).await
        }
        Commands::IssueToken {
            email,
            role,
            scoped,
            secret,
        } => cli::commands::issue_token(config, &email, &role, scoped, secret).await,
        Commands::Login {
            url,
            email,
            password,
            area,
            header,
        } => cli::commands::login(token_file, &url, &email, password, area, &header).await,
        Commands::Logout => cli::commands::logout(token_file).await,
        Commands::Whoami => cli::commands::whoami(token_file).await,
        Commands::Students { format } => cli::commands::students(token_file, format).await,
    }
}
