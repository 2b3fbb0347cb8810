use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use transliterator::{
    DEFAULT_LOG_LEVEL, EndPointRegistry, LEGACY_PREF_ROOT, MemoryPrefs, PREF_ROOT, PrefBranch,
    PreferenceMigrator, ProfileManager, parse_key_string, register_defaults,
};

/// Inspect transliterator preferences and command bindings.
#[derive(Debug, Parser)]
#[command(name = "translit", version, about)]
struct Cli {
    /// Profile file to use instead of the default location
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build and print the command endpoints
    Endpoints,
    /// Parse a shortcut string such as "Ctrl+Shift+VK_Q"
    ParseKey { shortcut: String },
    /// Migrate legacy preferences and save the profile
    Migrate,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TRANSLIT_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::ParseKey { shortcut } => {
            match parse_key_string(&shortcut) {
                Some(binding) => {
                    println!("key: {}", binding.key());
                    println!("modifiers: {}", binding.modifiers_string());
                }
                None => println!("no binding"),
            }
            Ok(())
        }
        Command::Endpoints => {
            let (_, store) = load_profile(cli.prefs)?;
            let registry = EndPointRegistry::new(store);
            let end_points = registry
                .end_points()
                .context("Failed to build endpoints")?;
            println!("layout: {}", registry.preferred_layout());
            for end_point in end_points.iter() {
                println!("{}", end_point);
            }
            Ok(())
        }
        Command::Migrate => {
            let (manager, store) = load_profile(cli.prefs)?;
            let migrator = PreferenceMigrator::new(
                PrefBranch::new(store.clone(), LEGACY_PREF_ROOT),
                PrefBranch::new(store.clone(), PREF_ROOT),
            );
            let copied = migrator.run().context("Failed to migrate preferences")?;
            manager.save(&store)?;
            info!(copied, path = ?manager.profile_path(), "profile saved");
            println!("migrated {} preference(s)", copied);
            Ok(())
        }
    }
}

/// Registers the defaults and loads the user's profile on top of them.
fn load_profile(path: Option<PathBuf>) -> Result<(ProfileManager, Arc<MemoryPrefs>)> {
    let manager = match path {
        Some(path) => ProfileManager::with_path(path),
        None => ProfileManager::new()?,
    };
    let store = Arc::new(MemoryPrefs::new());
    register_defaults(&store);
    manager.load_into(&store)?;
    Ok((manager, store))
}
