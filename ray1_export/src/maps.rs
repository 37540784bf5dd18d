use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use ray1_formats::{fingerprint, render_level, LevelMap};
use walkdir::WalkDir;

use crate::game::Game;
use crate::write_export_file;

/// Rendered output of one volume: the export name that labels its summary
/// column and the (level name, fingerprint) pairs it produced.
pub struct VolumeMaps {
    pub export_name: String,
    pub levels: Vec<(String, String)>,
}

/// Renders every `*.lev` under each of the game's volumes to a PNG and
/// fingerprints the raw raster. Volumes are processed sequentially; this
/// is the per-game unit handed to a worker thread.
pub fn export_game_maps(game: &Game, out_root: &Path) -> Result<Vec<VolumeMaps>> {
    let mut volumes = Vec::new();
    for volume in &game.volumes {
        let export_name = game.export_name(volume);
        let mut levels = Vec::new();

        for lev_path in find_level_files(&game.volume_dir(volume)) {
            let bytes = fs::read(&lev_path)
                .with_context(|| format!("reading {}", lev_path.display()))?;
            let level = LevelMap::decode(&bytes)
                .with_context(|| format!("decoding {}", lev_path.display()))?;
            let rgba = render_level(&level);

            let level_name = lev_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("LEVEL")
                .to_ascii_uppercase();

            let png_dir = out_root.join("Maps").join(&export_name);
            fs::create_dir_all(&png_dir)
                .with_context(|| format!("creating {}", png_dir.display()))?;
            let png_path = png_dir.join(format!("{level_name}.png"));
            export_rgba_to_png(
                &png_path,
                level.pixel_width() as u32,
                level.pixel_height() as u32,
                &rgba,
            )?;

            levels.push((level_name, fingerprint(&rgba)));
        }

        println!(
            "Exported {} maps for {}",
            levels.len(),
            export_name
        );
        volumes.push(VolumeMaps {
            export_name,
            levels,
        });
    }
    Ok(volumes)
}

fn find_level_files(volume_dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(volume_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("lev"))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}

fn export_rgba_to_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let encoder = PngEncoder::new(file);
    encoder
        .write_image(data, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("writing PNG to {}", path.display()))?;
    Ok(())
}

/// Merges per-volume fingerprints into the cross-build summary table: one
/// row per level name (sorted), one column per volume slot, blank cells
/// where a build lacks the level. Single-threaded by construction; the
/// workers only ever hand their finished slot back to this caller.
pub fn write_hash_sheet(out_root: &Path, per_volume: &[VolumeMaps]) -> Result<()> {
    let mut table: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (slot, volume) in per_volume.iter().enumerate() {
        for (level_name, digest) in &volume.levels {
            let row = table.entry(level_name).or_default();
            while row.len() < slot {
                row.push(String::new());
            }
            row.push(digest.clone());
        }
    }

    let mut buf = String::new();
    let mut push_value = |buf: &mut String, value: &str| {
        buf.push_str(value);
        buf.push(',');
    };

    push_value(&mut buf, "Level");
    for volume in per_volume {
        push_value(&mut buf, &volume.export_name);
    }
    buf.push('\n');

    for (level_name, row) in &table {
        push_value(&mut buf, level_name);
        for digest in row {
            push_value(&mut buf, digest);
        }
        buf.push('\n');
    }

    write_export_file(out_root, "Maps", "Hashes.csv", buf.as_bytes())
}
