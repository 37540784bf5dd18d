use std::path::Path;

use anyhow::{bail, Context, Result};
use ray1_formats::{DatArchive, TextScript, VersionScript};

use crate::game::Game;
use crate::scripts::{open_optional_archive, read_world_map};
use crate::write_export_file;

/// Comma-separated sheet in the layout the spreadsheets downstream expect:
/// every value double-quoted with a trailing comma, `/` markers from the
/// text table stripped.
pub struct Sheet {
    buf: String,
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet { buf: String::new() }
    }

    pub fn value(&mut self, value: &str) {
        self.buf.push('"');
        self.buf.push_str(value.trim_matches('/'));
        self.buf.push_str("\",");
    }

    pub fn end_row(&mut self) {
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Rows contributed by one volume, merged into one sheet by the caller in
/// game-slot order.
pub type SheetRows = Vec<Vec<String>>;

/// World/level topology rows for one volume: world and level names
/// resolved through the text table, plus the first link list's levels.
pub fn level_sheet_rows(game: &Game, volume: &str) -> Result<Option<SheetRows>> {
    let Some(special) = open_optional_archive(&game.special_dat(volume))? else {
        return Ok(None);
    };

    let text = TextScript::decode(special.read_entry("TEXT")?)
        .with_context(|| format!("decoding TEXT from {}", special.path().display()))?;
    let (_, world_map) = read_world_map(&special)?;

    let mut rows = Vec::new();
    for info in &world_map.map_define {
        // x position 0 marks an unused placeholder slot.
        if info.x_position == 0 {
            continue;
        }
        if info.has_level_variants() {
            bail!(
                "{} uses level variants, which are unsupported; aborting the batch",
                game.export_name(volume)
            );
        }

        let mut row = vec![
            game.export_name(volume),
            text.text(info.world_name).unwrap_or_default().to_string(),
            text.text(info.level_name).unwrap_or_default().to_string(),
        ];
        for link in &info.level_links[0] {
            match link.level_variants[0] {
                Some(level) => row.push(format!("{} {}", info.world, level)),
                None => row.push(String::new()),
            }
        }
        rows.push(row);
    }

    Ok(Some(rows))
}

pub fn write_level_sheet(out_root: &Path, per_volume: Vec<(String, SheetRows)>) -> Result<()> {
    let mut sheet = Sheet::new();
    for header in [
        "Game",
        "Level Name 1",
        "Level Name 2",
        "Part 1",
        "Part 2",
        "Part 3",
        "Part 4",
        "Part 5",
        "Part 6",
    ] {
        sheet.value(header);
    }
    sheet.end_row();

    for (_, rows) in per_volume {
        for row in rows {
            for value in &row {
                sheet.value(value);
            }
            sheet.end_row();
        }
    }

    write_export_file(out_root, "LevelSheet", "Levels.csv", sheet.finish().as_bytes())
}

/// One version-metadata row per volume: version codes, version modes and
/// language names, newline-joined within their cells.
pub fn version_sheet_row(game: &Game, volume: &str) -> Result<Option<Vec<String>>> {
    let Some(special) = open_optional_archive(&game.special_dat(volume))? else {
        return Ok(None);
    };
    let common = DatArchive::open(game.common_dat(volume))
        .with_context(|| format!("opening {}", game.common_dat(volume).display()))?;

    let version = VersionScript::decode(common.read_entry("VERSION")?)
        .with_context(|| format!("decoding VERSION from {}", common.path().display()))?;
    let text = TextScript::decode(special.read_entry("TEXT")?)
        .with_context(|| format!("decoding TEXT from {}", special.path().display()))?;

    Ok(Some(vec![
        game.export_name(volume),
        version.version_codes.join("\n"),
        version.version_modes.join("\n"),
        text.language_names.join("\n"),
    ]))
}

pub fn write_version_sheet(out_root: &Path, rows: Vec<Vec<String>>) -> Result<()> {
    let mut sheet = Sheet::new();
    for header in ["Game", "Version Codes", "Version Modes", "Languages"] {
        sheet.value(header);
    }
    sheet.end_row();

    for row in rows {
        for value in &row {
            sheet.value(value);
        }
        sheet.end_row();
    }

    write_export_file(out_root, "Versions", "Versions.csv", sheet.finish().as_bytes())
}
