//! cats library root.
//! Exposes the CLI parser, the high-level run() function and the domain modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, user: Option<&str>) -> AppResult<()> {
    let cmd = &cli.command;
    match cmd {
        Commands::Init { .. } => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(cmd, cfg),
        Commands::Db { .. } => commands::db::handle(cmd, cfg),
        Commands::Log { .. } => commands::log::handle(cmd, cfg),
        Commands::Backup { .. } => commands::backup::handle(cmd, cfg),
        Commands::User { .. } => commands::user::handle(cmd, cfg, user),
        Commands::Family { .. } => commands::family::handle(cmd, cfg, user),
        Commands::Tag { .. } => commands::tag::handle(cmd, cfg, user),
        Commands::Person { .. } => commands::person::handle(cmd, cfg, user),
        Commands::Checkin { .. } => commands::checkin::handle(cmd, cfg, user),
        Commands::Kiosk { .. } => commands::kiosk::handle(cmd, cfg, user),
        Commands::Print { .. } => commands::print::handle(cmd, cfg, user),
        Commands::Service { .. } => commands::service::handle(cmd, cfg, user),
        Commands::Report { .. } => commands::report::handle(cmd, cfg, user),
        Commands::Setting { .. } => commands::setting::handle(cmd, cfg, user),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // `init` writes the configuration, so it must not require one.
    let mut cfg = match cli.command {
        Commands::Init { .. } => Config::default(),
        _ => Config::load()?,
    };

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    let user = cli.user.clone().or_else(|| cfg.default_user.clone());
    dispatch(&cli, &cfg, user.as_deref())
}
