use super::args::{Cli, Commands, ConfigCommand};
use super::handlers::{self, HandlerContext};
use crate::config::{self, Config};
use crate::logging;
use anyhow::Result;
use tracing::debug;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let config_path = config::resolve_path(cli.config.as_deref())?;
    debug!(path = %config_path.display(), "resolved config path");

    // `config init` must work even when the existing file is broken
    if let Commands::Config {
        command: ConfigCommand::Init { force },
    } = &cli.command
    {
        return handlers::config::init(&config_path, *force);
    }

    let config = Config::load_from(&config_path)?;
    let ctx = HandlerContext::new(cli.format, config);

    match cli.command {
        Commands::Replay { file, workspace } => {
            handlers::replay::handle(&ctx, &file, workspace.as_deref())
        }

        Commands::Usage { file, workspace } => {
            handlers::usage::handle(&ctx, &file, workspace.as_deref())
        }

        Commands::Price { model } => handlers::price::handle(&ctx, &model),

        Commands::Sanitize { file, threshold } => {
            handlers::sanitize::handle(&ctx, &file, threshold)
        }

        Commands::Stats {
            file,
            workspace,
            created_at,
        } => handlers::stats::handle(&ctx, &file, workspace.as_deref(), created_at.as_deref()),

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(&ctx.config, &config_path),
            ConfigCommand::Init { force } => handlers::config::init(&config_path, force),
        },
    }
}
