mod game;
mod maps;
mod scripts;
mod sheets;
mod sounds;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use crate::game::Game;

#[derive(Parser, Debug)]
#[command(about = "Export assets from Rayman 1 educational game installs", version)]
struct Args {
    /// Game installation directory (may be passed multiple times)
    #[arg(long = "game", value_name = "DIR", required = true)]
    games: Vec<PathBuf>,

    /// Destination directory for export artifacts
    #[arg(long, value_name = "DIR", default_value = "Export")]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every level map to PNG and write a cross-build hash sheet
    Maps,
    /// Wrap every sound sample as a WAV file
    Sounds,
    /// Decode the script files and write them as JSON
    Scripts,
    /// Combine world map and text scripts into a level sheet
    LevelSheet,
    /// Tabulate version codes, modes and languages per build
    VersionSheet,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut games = Vec::new();
    for path in &args.games {
        games.push(
            Game::discover(path).with_context(|| format!("discovering {}", path.display()))?,
        );
    }
    println!("Exporting from {} games", games.len());

    match args.command {
        Command::Maps => {
            let per_game = for_each_game(&games, |game| maps::export_game_maps(game, &args.out))?;
            let per_volume: Vec<maps::VolumeMaps> = per_game.into_iter().flatten().collect();
            maps::write_hash_sheet(&args.out, &per_volume)?;
        }
        Command::Sounds => {
            for_each_game(&games, |game| sounds::export_game_sounds(game, &args.out))?;
        }
        Command::Scripts => {
            for_each_game(&games, |game| {
                for volume in &game.volumes {
                    match scripts::export_volume_scripts(game, volume, &args.out)? {
                        Some(written) => println!(
                            "Exported {} scripts for {}",
                            written,
                            game.export_name(volume)
                        ),
                        None => println!(
                            "No SPECIAL.DAT for {}, skipping",
                            game.export_name(volume)
                        ),
                    }
                }
                Ok(())
            })?;
        }
        Command::LevelSheet => {
            let per_game = for_each_game(&games, |game| {
                let mut rows = Vec::new();
                for volume in &game.volumes {
                    if let Some(volume_rows) = sheets::level_sheet_rows(game, volume)? {
                        rows.push((game.export_name(volume), volume_rows));
                    }
                }
                Ok(rows)
            })?;
            sheets::write_level_sheet(&args.out, per_game.into_iter().flatten().collect())?;
        }
        Command::VersionSheet => {
            let per_game = for_each_game(&games, |game| {
                let mut rows = Vec::new();
                for volume in &game.volumes {
                    if let Some(row) = sheets::version_sheet_row(game, volume)? {
                        rows.push(row);
                    }
                }
                Ok(rows)
            })?;
            sheets::write_version_sheet(&args.out, per_game.into_iter().flatten().collect())?;
        }
    }

    println!("Finished exporting from all games");
    Ok(())
}

/// Runs one export task per game on its own worker thread and collects the
/// results in game order. Volumes stay sequential inside each task; the
/// only cross-game merge is done by the caller on the returned values, so
/// nothing is shared between workers.
fn for_each_game<T, F>(games: &[Game], task: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Game) -> Result<T> + Sync,
{
    let task = &task;
    let joined: Vec<Result<T>> = thread::scope(|scope| {
        let handles: Vec<_> = games
            .iter()
            .map(|game| {
                scope.spawn(move || {
                    let value = task(game)?;
                    println!("Finished exporting {}", game.name);
                    Ok(value)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("export worker panicked")))
            })
            .collect()
    });

    let mut results = Vec::with_capacity(joined.len());
    for result in joined {
        results.push(result?);
    }
    Ok(results)
}

/// Creates `<out>/<dir>` and writes `<file>` inside it.
pub fn write_export_file(out_root: &Path, dir: &str, file: &str, bytes: &[u8]) -> Result<()> {
    let dir_path = out_root.join(dir);
    fs::create_dir_all(&dir_path)
        .with_context(|| format!("creating {}", dir_path.display()))?;
    let file_path = dir_path.join(file);
    fs::write(&file_path, bytes).with_context(|| format!("writing {}", file_path.display()))?;
    Ok(())
}
