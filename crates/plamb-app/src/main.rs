//! Command-line entry point.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use plamb_app::{LevelSummary, Script, ShortcutRegistry, replay};
use plamb_core::{
    EditorSession, EditorSettings, FileStorage, LevelFile, LevelFolder, LevelStorage,
    ObjectCatalog, SaveMode,
};

#[derive(Parser)]
#[command(name = "plamb")]
#[command(about = "Headless driver for the Plamb level editor", long_about = None)]
struct Cli {
    /// Editor settings JSON (defaults are used when omitted)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Object catalog JSON (the built-in catalog is used when omitted)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a scripted editor session and export the resulting level
    Replay {
        /// Script JSON file
        script: PathBuf,

        /// Write the level JSON to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the level into the custom level folder under this name
        #[arg(long)]
        save_as: Option<String>,

        /// Allow replacing an existing level
        #[arg(long)]
        overwrite: bool,
    },
    /// Validate a level file against the catalog and print a summary
    Inspect {
        /// Level JSON file
        level: PathBuf,
    },
    /// List levels in the default level folder
    Levels {
        /// List built-in levels instead of custom ones
        #[arg(long)]
        builtin: bool,
    },
    /// Print the effective editor settings
    Settings,
    /// Print the key bindings used by scripts
    Keys,
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<EditorSettings> {
    match path {
        Some(path) => Ok(EditorSettings::load(path)?),
        None => Ok(EditorSettings::default()),
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<ObjectCatalog> {
    match path {
        Some(path) => Ok(ObjectCatalog::load(path)?),
        None => Ok(ObjectCatalog::builtin()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting Plamb level editor driver");

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            script,
            output,
            save_as,
            overwrite,
        } => {
            let settings = load_settings(cli.settings.as_deref())?;
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let json = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let script = Script::from_json(&json)?;

            let mut session = EditorSession::new(settings, catalog)?;
            let result = replay(&mut session, script)?;
            let level_json = result.level.to_json()?;

            match output {
                Some(path) => std::fs::write(&path, &level_json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", level_json),
            }

            if let Some(name) = save_as {
                let storage = FileStorage::default_location(LevelFolder::Custom)?;
                let mode = if overwrite {
                    SaveMode::Overwrite
                } else {
                    SaveMode::CreateNew
                };
                storage.save(&name, &result.level, mode)?;
                eprintln!("Saved {} to {}", name, storage.base_path().display());
            }
        }
        Command::Inspect { level } => {
            let settings = load_settings(cli.settings.as_deref())?;
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let json = std::fs::read_to_string(&level)
                .with_context(|| format!("Failed to read level {}", level.display()))?;
            let level = LevelFile::from_json(&json)?;
            println!("{}", LevelSummary::from_level(&level, &catalog, &settings)?);
        }
        Command::Levels { builtin } => {
            let folder = if builtin {
                LevelFolder::Builtin
            } else {
                LevelFolder::Custom
            };
            let storage = FileStorage::default_location(folder)?;
            for name in storage.list()? {
                println!("{}", name);
            }
        }
        Command::Settings => {
            let settings = load_settings(cli.settings.as_deref())?;
            println!("{}", settings.to_json()?);
        }
        Command::Keys => ShortcutRegistry::print_all(),
    }

    Ok(())
}
