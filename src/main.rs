use clap::Parser;
use color_eyre::Result;
use stickies::{Config, Desk, Profile, cli::{self, Cli, Commands}};
use tracing::info;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load_with_profile(profile)?,
    };

    // Palette output goes to stdout, so it runs without a log subscriber
    if let Some(Commands::Palette { json }) = cli.command {
        cli::handle_palette(&config, json, &mut std::io::stdout().lock())?;
        return Ok(());
    }

    stickies::logging::init(&config.logging, config.get_log_path(profile).as_deref());
    info!(?profile, "starting");

    let mut desk = Desk::from_config(&config)?;
    match cli.command {
        Some(Commands::Open { ref files }) => {
            cli::handle_open(&mut desk, files)?;
        }
        _ => {
            desk.new_text_note()?;
        }
    }

    let app = stickies::tui::App::new(config, desk)?;
    stickies::tui::run_event_loop(app)?;

    info!("exiting");
    Ok(())
}
