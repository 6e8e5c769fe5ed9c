mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers::{self, SettingsUpdate};
use miqat::config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB (WAL, migrations on every start)
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = miqat::db::open(&db_path)?;

    match cli.command {
        Some(Commands::Times { masjid, json }) => {
            handlers::handle_times(&conn, &config, masjid.as_deref(), json)?;
        }
        Some(Commands::Next { masjid }) => {
            handlers::handle_next(&conn, &config, masjid.as_deref())?;
        }
        Some(Commands::Qibla { lat, lon }) => {
            handlers::handle_qibla(&config, lat, lon)?;
        }
        Some(Commands::Settings {
            school,
            method,
            lat,
            lon,
            name,
            source,
            tz,
            hijri_offset,
            clock_24h,
        }) => {
            let update = SettingsUpdate {
                school,
                method,
                lat,
                lon,
                name,
                source,
                tz,
                hijri_offset,
                clock_24h,
            };
            handlers::handle_settings(&mut config, update)?;
        }
        Some(Commands::Masjid { action }) => {
            handlers::handle_masjid(&conn, &mut config, action)?;
        }
        Some(Commands::Quran { action }) => {
            handlers::handle_quran(&conn, action)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config, db_path)?;
        }
    }

    Ok(())
}
