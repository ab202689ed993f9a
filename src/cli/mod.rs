pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "jobly-api")]
#[command(about = "Jobly - JSON API for companies, jobs and users")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, short, env = "JOBLY_API_PORT", help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Print a signed token for a user without contacting the server")]
    Token {
        #[arg(help = "Username to embed in the token")]
        username: String,
        #[arg(long, help = "Mark the token as an admin token")]
        admin: bool,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Token { username, admin } => commands::token::handle(&config, &username, admin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["jobly-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_token_command() {
        let cli = Cli::try_parse_from(["jobly-api", "token", "u1", "--admin"]).unwrap();
        match cli.command {
            Some(Commands::Token { username, admin }) => {
                assert_eq!(username, "u1");
                assert!(admin);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_serve_port() {
        let cli = Cli::try_parse_from(["jobly-api", "serve", "--port", "4000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(4000) })));
    }
}
