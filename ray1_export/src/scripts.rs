use std::path::Path;

use anyhow::{Context, Result};
use ray1_formats::{
    DatArchive, Error, SampleNamesScript, TextScript, VersionScript, WordsScript, WorldMapScript,
};
use serde::Serialize;

use crate::game::Game;
use crate::write_export_file;

/// Opens an archive that is allowed to be absent (some volumes ship
/// without `SPECIAL.DAT`); only a missing file maps to `None`.
pub fn open_optional_archive(path: &Path) -> Result<Option<DatArchive>> {
    match DatArchive::open(path) {
        Ok(archive) => Ok(Some(archive)),
        Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("opening {}", path.display())),
    }
}

/// The world map entry is numbered (`WLDMAP01`, `WLDMAP02`, ...); take the
/// first one present in directory order, returning its name alongside the
/// decoded script so outputs keep the numbered entry name.
pub fn read_world_map(special: &DatArchive) -> Result<(String, WorldMapScript)> {
    let entry = special
        .entries()
        .iter()
        .find(|entry| entry.name.to_ascii_uppercase().starts_with("WLDMAP"))
        .ok_or_else(|| Error::not_found(special.path().display().to_string(), "WLDMAP*"))?;

    let script = WorldMapScript::decode(special.read_entry_bytes(entry))
        .with_context(|| format!("decoding {} from {}", entry.name, special.path().display()))?;
    Ok((entry.name.clone(), script))
}

fn write_script_json<T: Serialize>(
    out_root: &Path,
    export_name: &str,
    name: &str,
    script: &T,
) -> Result<()> {
    let json = serde_json::to_string_pretty(script)
        .with_context(|| format!("serializing {name} for {export_name}"))?;
    write_export_file(
        out_root,
        &format!("Scripts/{export_name}"),
        &format!("{name}.json"),
        json.as_bytes(),
    )
}

/// Decodes every script of one volume and writes each as pretty JSON under
/// `Scripts/<export name>/`. Returns the number of scripts written, or
/// `None` when the volume has no `SPECIAL.DAT`.
pub fn export_volume_scripts(game: &Game, volume: &str, out_root: &Path) -> Result<Option<usize>> {
    let Some(special) = open_optional_archive(&game.special_dat(volume))? else {
        return Ok(None);
    };
    let common = DatArchive::open(game.common_dat(volume))
        .with_context(|| format!("opening {}", game.common_dat(volume).display()))?;

    let export_name = game.export_name(volume);
    let mut written = 0usize;

    let version = VersionScript::decode(common.read_entry("VERSION")?)
        .with_context(|| format!("decoding VERSION from {}", common.path().display()))?;
    write_script_json(out_root, &export_name, "VERSION", &version)?;
    written += 1;

    let words = WordsScript::decode(special.read_entry("MOT")?)
        .with_context(|| format!("decoding MOT from {}", special.path().display()))?;
    write_script_json(out_root, &export_name, "MOT", &words)?;
    written += 1;

    let text = TextScript::decode(special.read_entry("TEXT")?)
        .with_context(|| format!("decoding TEXT from {}", special.path().display()))?;
    write_script_json(out_root, &export_name, "TEXT", &text)?;
    written += 1;

    let (world_map_name, world_map) = read_world_map(&special)?;
    write_script_json(out_root, &export_name, &world_map_name, &world_map)?;
    written += 1;

    let sample_names = SampleNamesScript::decode(special.read_entry("SMPNAMES")?)
        .with_context(|| format!("decoding SMPNAMES from {}", special.path().display()))?;
    write_script_json(out_root, &export_name, "SMPNAMES", &sample_names)?;
    written += 1;

    Ok(Some(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use std::fs;
    use tempfile::TempDir;

    fn push_pascal(data: &mut Vec<u8>, text: &str) {
        data.push(text.len() as u8);
        data.extend_from_slice(text.as_bytes());
    }

    fn dat_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut directory = Vec::new();
        directory.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        let mut offset = 2 + entries.len() * 17;
        let mut payload = Vec::new();
        for (name, bytes) in entries {
            let mut field = [0u8; 9];
            field[..name.len()].copy_from_slice(name.as_bytes());
            directory.extend_from_slice(&field);
            directory.extend_from_slice(&(offset as u32).to_le_bytes());
            directory.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            offset += bytes.len();
            payload.extend_from_slice(bytes);
        }
        directory.extend_from_slice(&payload);
        directory
    }

    #[test]
    fn world_map_json_keeps_numbered_entry_name() {
        let game_dir = TempDir::new().unwrap();
        let volume_dir = game_dir.path().join("PCMAP").join("GB1");
        fs::create_dir_all(&volume_dir).unwrap();

        let mut version = vec![1u8];
        push_pascal(&mut version, "GB1");
        push_pascal(&mut version, "EDU");
        fs::write(
            game_dir.path().join("PCMAP").join("COMMON.DAT"),
            dat_bytes(&[("VERSION", version)]),
        )
        .unwrap();

        let mut words = Vec::new();
        words.extend_from_slice(&1u16.to_le_bytes());
        push_pascal(&mut words, "jump");
        let mut text = vec![1u8];
        push_pascal(&mut text, "English");
        text.extend_from_slice(&0u16.to_le_bytes());
        let sample_names = 0u16.to_le_bytes().to_vec();
        // Empty world map under the second numbered name.
        let special = dat_bytes(&[
            ("MOT", words),
            ("TEXT", text),
            ("WLDMAP02", vec![0u8]),
            ("SMPNAMES", sample_names),
        ]);
        fs::write(volume_dir.join("SPECIAL.DAT"), special).unwrap();

        let game = Game::discover(game_dir.path()).unwrap();
        let out = TempDir::new().unwrap();
        let written = export_volume_scripts(&game, "GB1", out.path()).unwrap();
        assert_eq!(written, Some(5));

        let scripts_dir = out.path().join("Scripts").join(game.export_name("GB1"));
        assert!(scripts_dir.join("WLDMAP02.json").is_file());
        assert!(!scripts_dir.join("WLDMAP.json").exists());
        assert!(scripts_dir.join("VERSION.json").is_file());
        assert!(scripts_dir.join("MOT.json").is_file());
    }

    #[test]
    fn missing_archive_is_skipped_not_an_error() {
        let dir = TempDir::new().unwrap();
        let archive = open_optional_archive(&dir.path().join("SPECIAL.DAT")).unwrap();
        assert!(archive.is_none());
    }

    #[test]
    fn unreadable_archive_still_fails() {
        let dir = TempDir::new().unwrap();
        // A present-but-garbage archive must surface its format error.
        let path = dir.path().join("SPECIAL.DAT");
        std::fs::write(&path, [0xFFu8; 1]).unwrap();
        assert!(open_optional_archive(&path).is_err());
    }
}
