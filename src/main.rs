use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use skydeck_core::{App, Config, ConfigError};
use skydeck_dashboard::{Controller, Renderer, TextRenderer};
use skydeck_weather::{cities, RemoveOutcome};

/// Skydeck - multi-location weather dashboard
#[derive(Parser, Debug)]
#[command(name = "skydeck")]
#[command(about = "Three-day forecasts for your location and the cities you follow")]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the dashboard, locating you on first run (default)
    Show,
    /// Refresh every tracked location
    Refresh,
    /// Track a city from the catalog
    Add {
        /// City name, optionally as "Name, Country"
        city: Vec<String>,
    },
    /// Stop tracking a location by id
    Remove { id: String },
    /// List tracked locations
    List,
    /// List catalog cities, optionally filtered by prefix
    Cities { prefix: Option<String> },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    skydeck_core::init()?;

    let loaded = match &args.config {
        Some(path) => App::from_path(path),
        None => App::new(),
    };
    let mut app = loaded.inspect_err(|e| {
        if let Some(config_err) = e.downcast_ref::<ConfigError>() {
            eprintln!("{}", config_err.user_message());
        }
    })?;
    app.initialize()?;

    let command = args.command.unwrap_or(Command::Show);
    let result = run(&app, args.config.as_deref(), command).await;

    app.shutdown()?;
    result
}

async fn run(app: &App, config_path: Option<&Path>, command: Command) -> Result<()> {
    tracing::debug!("Running {:?}", command);

    match command {
        Command::Cities { prefix } => {
            let matches = match prefix {
                Some(prefix) => cities::suggest(&prefix, cities::CITY_LIST.len()),
                None => cities::CITY_LIST.iter().collect(),
            };
            for city in matches {
                println!("{}, {}", city.name, city.country);
            }
            return Ok(());
        }
        Command::Config => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => Config::config_path()?,
            };
            println!("config file:       {}", path.display());
            print_config(app.config());
            return Ok(());
        }
        _ => {}
    }

    let mut controller = Controller::from_config(app.config())?;
    let mut renderer = TextRenderer::new(io::stdout().lock());

    match command {
        Command::Show => {
            controller.start().await;
            renderer.render(controller.dashboard())?;
        }
        Command::Refresh => {
            controller.refresh_all().await;
            renderer.render(controller.dashboard())?;
        }
        Command::Add { city } => {
            let query = city.join(" ");
            let added = controller.add_city(&query).await.inspect_err(|e| {
                eprintln!("{}", e.user_message());
                let suggestions = cities::suggest(&query, 5);
                if !suggestions.is_empty() {
                    let names: Vec<_> = suggestions.iter().map(|c| c.name).collect();
                    eprintln!("Did you mean: {}", names.join(", "));
                }
            })?;
            if let Some(card) = added.and_then(|loc| controller.dashboard().card(&loc.id)) {
                renderer.render_card(card)?;
            }
            print_status(&controller);
        }
        Command::Remove { id } => {
            let outcome = controller.remove_location(&id);
            print_status(&controller);
            if outcome != RemoveOutcome::Removed {
                anyhow::bail!("Could not remove {}: {:?}", id, outcome);
            }
        }
        Command::List => {
            for location in controller.store().locations() {
                let marker = if location.is_current { " *" } else { "" };
                println!("{:<32} {}{}", location.id, location.display_name, marker);
            }
        }
        Command::Cities { .. } | Command::Config => {}
    }

    Ok(())
}

fn print_status(controller: &Controller) {
    if let Some(status) = controller.dashboard().global_status() {
        println!("{}", status);
    }
}

fn print_config(config: &Config) {
    println!("weather api:       {}", config.weather.api_url);
    println!("temperature unit:  {:?}", config.weather.temperature_unit);
    println!("request timeout:   {}s", config.weather.request_timeout_secs);
    println!("geolocation url:   {}", config.location.geolocation_url);
    println!("geolocation wait:  {}s", config.location.geolocation_timeout_secs);
    println!("reverse geocode:   {}", config.location.reverse_geocode);
    println!("data dir:          {}", config.storage.data_dir.display());
}
