//! Command-line consumer of the store: list, detail, create and delete views.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use crate::city::{City, CityDraft, Position, PositionError};
use crate::config::Config;
use crate::logging::init_tracing;
use crate::store::{CitiesState, CityStore};
use crate::transport::{CityTransport, HttpTransport};

#[derive(Debug, Parser)]
#[command(name = "citylog", version, about = "Keep a log of the cities you have visited")]
pub struct Cli {
    /// Config file (default: platform config dir/citylog/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override api.base_url from the config file
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every visited city
    List,
    /// Show one city in detail
    Show { id: String },
    /// Record a new city visit
    Add(AddArgs),
    /// Delete a city visit
    Remove { id: String },
    /// Print map markers as `lat,lng emoji name`
    Markers,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub emoji: String,

    #[arg(long, allow_hyphen_values = true, requires = "lng", conflicts_with = "at")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat", conflicts_with = "at")]
    pub lng: Option<f64>,

    /// Map click position as `lat=..&lng=..`
    #[arg(long, value_name = "QUERY")]
    pub at: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl AddArgs {
    pub fn position(&self) -> Result<Position, PositionError> {
        if let Some(query) = &self.at {
            return Position::parse_query(query);
        }
        let lat = self.lat.ok_or(PositionError::Missing("lat"))?;
        let lng = self.lng.ok_or(PositionError::Missing("lng"))?;
        Position::try_new(lat, lng)
    }

    pub fn draft(&self) -> Result<CityDraft, PositionError> {
        let mut draft = CityDraft::new(self.name.trim(), self.emoji.trim(), self.position()?);
        draft.date = self.date.clone();
        draft.notes = self.notes.clone().filter(|n| !n.trim().is_empty());
        Ok(draft)
    }
}

/// Loads config, opens a store against the configured API, and runs the
/// command. Store errors come back as `Err` carrying the store's message.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }?
    .with_base_url(cli.base_url.clone());
    config.validate()?;
    init_tracing(&config.logging);

    let transport = HttpTransport::from_config(&config.api)
        .with_context(|| format!("Cannot reach cities API at {}", config.api.base_url))?;
    let output = execute(cli.command, transport).await?;
    print!("{}", output);
    Ok(())
}

/// Runs one command against a freshly opened store and renders the result.
///
/// Only the collection views fail on a failed initial load; the other
/// commands report the outcome of their own operation. The store is closed
/// on every path.
pub async fn execute<T: CityTransport>(command: Command, transport: T) -> anyhow::Result<String> {
    let store = CityStore::open(transport).await;
    let result = run_command(&store, command).await;
    store.close();
    result
}

async fn run_command<T: CityTransport>(store: &CityStore<T>, command: Command) -> anyhow::Result<String> {
    let output = match command {
        Command::List => {
            let state = store.snapshot();
            check(&state)?;
            render_list(&state)
        }
        Command::Markers => {
            let state = store.snapshot();
            check(&state)?;
            render_markers(&state)
        }
        Command::Show { id } => {
            store.focus_on(id.as_str()).await;
            let state = store.snapshot();
            check(&state)?;
            match state.focus() {
                Some(city) => render_city(city),
                None => bail!("No city with id {}", id),
            }
        }
        Command::Add(args) => {
            let draft = args.draft()?;
            store.create(draft).await;
            let state = store.snapshot();
            check(&state)?;
            match state.focus() {
                Some(city) => format!("Added {} (id {})\n", city.name(), city.id),
                None => bail!("Server did not return the created city"),
            }
        }
        Command::Remove { id } => {
            store.remove(id.as_str()).await;
            check(&store.snapshot())?;
            format!("Removed city {}\n", id)
        }
    };
    Ok(output)
}

fn check(state: &CitiesState) -> anyhow::Result<()> {
    match state.error() {
        Some(message) => bail!("{}", message),
        None => Ok(()),
    }
}

pub fn render_list(state: &CitiesState) -> String {
    if state.cities().is_empty() {
        return "Add your first city with `citylog add`.\n".to_string();
    }
    let mut out = String::new();
    for city in state.cities() {
        let _ = writeln!(
            out,
            "{:>4}  {} {:<24} {}",
            city.id,
            city.fields.emoji,
            city.name(),
            city.fields.date.as_deref().unwrap_or("")
        );
    }
    out
}

pub fn render_city(city: &City) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", city.fields.emoji, city.name());
    let _ = writeln!(out, "  id:       {}", city.id);
    let _ = writeln!(out, "  position: {}", city.position());
    if let Some(date) = &city.fields.date {
        let _ = writeln!(out, "  visited:  {}", date);
    }
    if let Some(notes) = &city.fields.notes {
        let _ = writeln!(out, "  notes:    {}", notes);
    }
    out
}

pub fn render_markers(state: &CitiesState) -> String {
    let mut out = String::new();
    for marker in state.markers() {
        let _ = writeln!(
            out,
            "{},{} {} {}",
            marker.position.lat, marker.position.lng, marker.emoji, marker.label
        );
    }
    out
}
