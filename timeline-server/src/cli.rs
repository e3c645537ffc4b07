use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Server options can also be provided via environment variables
(a .env file in the working directory is loaded first):
  CONFIG_PATH       (default: ./config.yaml, optional)
  DB_PATH           (default: data/app.db)
  OPENAI_API_KEY    (required for timeline generation)
  OPENAI_BASE_URL   (default: https://api.openai.com/v1)
  OPENAI_MODEL      (default: gpt-3.5-turbo)
  LLM_TIMEOUT_SECS  (default: 120)
  PORT              (default: 8080 or config.listen_port)
  ALLOW_ORIGINS     (comma-separated CORS origins)

Log verbosity follows RUST_LOG (default: info).
"#;

#[derive(Debug, Parser)]
#[command(
    name = "timeline-server",
    version,
    about = "Goal timeline generator (GraphQL API)",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Optional subcommand. Without one, runs the server.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Wipe the database and insert the sample user, goal and timeline
    Seed,
    /// Print the GraphQL schema (SDL) and exit
    Schema,
}
