use std::path::Path;

use anyhow::Result;
use ray1_formats::{wrap_pcm_mono8, DatArchive};

use crate::game::Game;
use crate::scripts::open_optional_archive;
use crate::write_export_file;

/// Wraps every raw sample in each volume's `SNDSMP.DAT` as a WAV file
/// under `Sounds/<export name>/`. Volumes without a sample archive are
/// skipped.
pub fn export_game_sounds(game: &Game, out_root: &Path) -> Result<()> {
    for volume in &game.volumes {
        let path = game.sound_samples_dat(volume);
        let Some(archive) = open_optional_archive(&path)? else {
            println!("No sample archive for {}, skipping", game.export_name(volume));
            continue;
        };

        let written = export_archive_sounds(&archive, &game.export_name(volume), out_root)?;
        println!(
            "Exported {} sounds for {}",
            written,
            game.export_name(volume)
        );
    }
    Ok(())
}

fn export_archive_sounds(
    archive: &DatArchive,
    export_name: &str,
    out_root: &Path,
) -> Result<usize> {
    let mut written = 0usize;
    for entry in archive.entries() {
        let wav = wrap_pcm_mono8(archive.read_entry_bytes(entry));
        write_export_file(
            out_root,
            &format!("Sounds/{export_name}"),
            &format!("{}.wav", entry.name),
            &wav,
        )?;
        written += 1;
    }
    Ok(written)
}
