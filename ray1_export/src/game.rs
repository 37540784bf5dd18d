use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};

/// Engine build of one game installation, detected from marker files the
/// installers leave in the game root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineVersion {
    PcEdu,
    PcKit,
    PcFan,
    Ps1Edu,
}

impl EngineVersion {
    fn detect(game_root: &Path) -> EngineVersion {
        if game_root.join("SYSTEM.CNF").exists() {
            EngineVersion::Ps1Edu
        } else if game_root.join("RAYKIT.EXE").exists() {
            EngineVersion::PcKit
        } else if game_root.join("RAYFAN.EXE").exists() || game_root.join("RAYPLUS.EXE").exists() {
            EngineVersion::PcFan
        } else {
            EngineVersion::PcEdu
        }
    }
}

/// One game installation: a directory with a `PCMAP/` tree whose
/// subdirectories are volumes (localized builds such as `GB1`).
#[derive(Debug, Clone)]
pub struct Game {
    pub path: PathBuf,
    pub name: String,
    pub engine: EngineVersion,
    pub volumes: Vec<String>,
}

impl Game {
    pub fn discover(path: &Path) -> Result<Game> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| path.display().to_string());

        let pcmap = path.join("PCMAP");
        ensure!(
            pcmap.is_dir(),
            "{} has no PCMAP directory; not a supported game install",
            path.display()
        );

        let mut volumes = Vec::new();
        for entry in
            fs::read_dir(&pcmap).with_context(|| format!("listing {}", pcmap.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(volume) = entry.file_name().to_str() {
                    volumes.push(volume.to_ascii_uppercase());
                }
            }
        }
        ensure!(
            !volumes.is_empty(),
            "{} contains no volume directories",
            pcmap.display()
        );
        // Directory-listing order, made deterministic across platforms.
        volumes.sort();

        Ok(Game {
            path: path.to_path_buf(),
            name,
            engine: EngineVersion::detect(path),
            volumes,
        })
    }

    /// Display and output-directory name for one volume of this game,
    /// e.g. `RAYMAN EDU - GB1`.
    pub fn export_name(&self, volume: &str) -> String {
        format!("{} - {}", self.name, volume)
    }

    pub fn volume_dir(&self, volume: &str) -> PathBuf {
        self.path.join("PCMAP").join(volume)
    }

    /// `COMMON.DAT` is shared across volumes on PC but per-volume on PS1.
    pub fn common_dat(&self, volume: &str) -> PathBuf {
        match self.engine {
            EngineVersion::Ps1Edu => self.volume_dir(volume).join("COMMON.DAT"),
            _ => self.path.join("PCMAP").join("COMMON.DAT"),
        }
    }

    pub fn special_dat(&self, volume: &str) -> PathBuf {
        self.volume_dir(volume).join("SPECIAL.DAT")
    }

    pub fn sound_samples_dat(&self, volume: &str) -> PathBuf {
        self.volume_dir(volume).join("SNDSMP.DAT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_game(volumes: &[&str], markers: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for volume in volumes {
            fs::create_dir_all(dir.path().join("PCMAP").join(volume)).unwrap();
        }
        for marker in markers {
            fs::write(dir.path().join(marker), b"").unwrap();
        }
        dir
    }

    #[test]
    fn discovers_sorted_volumes_and_default_engine() {
        let dir = make_game(&["us1", "GB1"], &[]);
        let game = Game::discover(dir.path()).unwrap();
        assert_eq!(game.volumes, vec!["GB1", "US1"]);
        assert_eq!(game.engine, EngineVersion::PcEdu);
    }

    #[test]
    fn marker_files_select_engine_version() {
        let kit = make_game(&["GB1"], &["RAYKIT.EXE"]);
        assert_eq!(
            Game::discover(kit.path()).unwrap().engine,
            EngineVersion::PcKit
        );

        let fan = make_game(&["GB1"], &["RAYPLUS.EXE"]);
        assert_eq!(
            Game::discover(fan.path()).unwrap().engine,
            EngineVersion::PcFan
        );

        let ps1 = make_game(&["GB1"], &["SYSTEM.CNF"]);
        assert_eq!(
            Game::discover(ps1.path()).unwrap().engine,
            EngineVersion::Ps1Edu
        );
    }

    #[test]
    fn common_dat_is_per_volume_only_on_ps1() {
        let pc = make_game(&["GB1"], &[]);
        let game = Game::discover(pc.path()).unwrap();
        assert_eq!(
            game.common_dat("GB1"),
            pc.path().join("PCMAP").join("COMMON.DAT")
        );

        let ps1 = make_game(&["GB1"], &["SYSTEM.CNF"]);
        let game = Game::discover(ps1.path()).unwrap();
        assert_eq!(
            game.common_dat("GB1"),
            ps1.path().join("PCMAP").join("GB1").join("COMMON.DAT")
        );
    }

    #[test]
    fn rejects_directory_without_pcmap() {
        let dir = TempDir::new().unwrap();
        assert!(Game::discover(dir.path()).is_err());
    }
}
