//! Fixed-layout script files carried inside the `COMMON.DAT` and
//! `SPECIAL.DAT` archives. Each kind is counts-then-payload; strings are
//! one-byte-length-prefixed DOS text, sample names the same 9-byte fields
//! the archive directory uses. Decoded records are read-only; callers
//! resolve cross-references such as text ids themselves.

use serde::Serialize;

use crate::error::Result;
use crate::reader::Reader;

/// Sentinel byte for an absent level or demo reference.
const NO_LEVEL: u8 = 0xFF;

/// Build identification (`VERSION`, common archive): parallel lists of
/// version codes (also the volume directory names) and mode labels.
#[derive(Debug, Clone, Serialize)]
pub struct VersionScript {
    pub version_codes: Vec<String>,
    pub version_modes: Vec<String>,
}

impl VersionScript {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes, "VERSION script");
        let count = reader.u8("version count")? as usize;

        let mut version_codes = Vec::with_capacity(count);
        for _ in 0..count {
            version_codes.push(reader.pascal_string("version code")?);
        }
        let mut version_modes = Vec::with_capacity(count);
        for _ in 0..count {
            version_modes.push(reader.pascal_string("version mode")?);
        }

        Ok(VersionScript {
            version_codes,
            version_modes,
        })
    }
}

/// Localized text table (`TEXT`, special archive). Strings are addressed by
/// ordinal id; world and level names in the world map reference them.
#[derive(Debug, Clone, Serialize)]
pub struct TextScript {
    pub language_names: Vec<String>,
    pub text_define: Vec<String>,
}

impl TextScript {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes, "TEXT script");

        let language_count = reader.u8("language count")? as usize;
        let mut language_names = Vec::with_capacity(language_count);
        for _ in 0..language_count {
            language_names.push(reader.pascal_string("language name")?);
        }

        let text_count = reader.u16("text define count")? as usize;
        let mut text_define = Vec::with_capacity(text_count);
        for _ in 0..text_count {
            text_define.push(reader.pascal_string("text define entry")?);
        }

        Ok(TextScript {
            language_names,
            text_define,
        })
    }

    pub fn text(&self, id: u16) -> Option<&str> {
        self.text_define.get(id as usize).map(String::as_str)
    }
}

/// Word list (`MOT`, special archive).
#[derive(Debug, Clone, Serialize)]
pub struct WordsScript {
    pub words: Vec<String>,
}

impl WordsScript {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes, "MOT script");
        let count = reader.u16("word count")? as usize;
        let mut words = Vec::with_capacity(count);
        for _ in 0..count {
            words.push(reader.pascal_string("word")?);
        }
        Ok(WordsScript { words })
    }
}

/// Sound sample name table (`SMPNAMES`, special archive). Names line up
/// with entries in the volume's `SNDSMP.DAT`.
#[derive(Debug, Clone, Serialize)]
pub struct SampleNamesScript {
    pub names: Vec<String>,
}

impl SampleNamesScript {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes, "SMPNAMES script");
        let count = reader.u16("sample name count")? as usize;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(reader.fixed_name::<9>("sample name")?);
        }
        Ok(SampleNamesScript { names })
    }
}

/// One entry in a world-map level link list. Variant slot 0 is the level
/// the link leads to; the games reserve five slots per entry.
#[derive(Debug, Clone, Serialize)]
pub struct LevelLinkEntry {
    pub level_variants: [Option<u8>; 5],
}

/// One world-map node. `world_name` and `level_name` index the `TEXT`
/// table; `x_position == 0` marks an unused placeholder slot.
#[derive(Debug, Clone, Serialize)]
pub struct WorldInfo {
    pub world_name: u16,
    pub level_name: u16,
    pub x_position: u16,
    pub y_position: u16,
    pub kind: u8,
    pub world: u8,
    pub lives_count: u8,
    pub level_links: [Vec<LevelLinkEntry>; 5],
    pub level_variants: [[u8; 5]; 5],
    pub running_demo: Option<u8>,
}

impl WorldInfo {
    /// Nonzero variant data means the node uses per-level variations,
    /// which no known build of these games ships.
    pub fn has_level_variants(&self) -> bool {
        self.level_variants
            .iter()
            .flatten()
            .any(|&variant| variant != 0)
    }
}

/// World topology (`WLDMAPxx`, special archive).
#[derive(Debug, Clone, Serialize)]
pub struct WorldMapScript {
    pub map_define: Vec<WorldInfo>,
}

impl WorldMapScript {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes, "WLDMAP script");
        let count = reader.u8("world info count")? as usize;
        let mut map_define = Vec::with_capacity(count);
        for _ in 0..count {
            map_define.push(decode_world_info(&mut reader)?);
        }
        Ok(WorldMapScript { map_define })
    }
}

fn decode_world_info(reader: &mut Reader<'_>) -> Result<WorldInfo> {
    let world_name = reader.u16("world name id")?;
    let level_name = reader.u16("level name id")?;
    let x_position = reader.u16("x position")?;
    let y_position = reader.u16("y position")?;
    let kind = reader.u8("world info type")?;
    let world = reader.u8("world number")?;
    let lives_count = reader.u8("lives count")?;

    let mut level_links: [Vec<LevelLinkEntry>; 5] = Default::default();
    for list in level_links.iter_mut() {
        let entry_count = reader.u8("level link count")? as usize;
        list.reserve(entry_count);
        for _ in 0..entry_count {
            let raw = reader.array::<5>("level link variants")?;
            list.push(LevelLinkEntry {
                level_variants: raw.map(|value| (value != NO_LEVEL).then_some(value)),
            });
        }
    }

    let mut level_variants = [[0u8; 5]; 5];
    for row in level_variants.iter_mut() {
        *row = reader.array::<5>("level variant row")?;
    }

    let running_demo = {
        let raw = reader.u8("running demo level")?;
        (raw != NO_LEVEL).then_some(raw)
    };

    Ok(WorldInfo {
        world_name,
        level_name,
        x_position,
        y_position,
        kind,
        world,
        lives_count,
        level_links,
        level_variants,
        running_demo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn push_pascal(data: &mut Vec<u8>, text: &str) {
        data.push(text.len() as u8);
        data.extend_from_slice(text.as_bytes());
    }

    #[test]
    fn decodes_version_script() {
        let mut data = vec![2u8];
        push_pascal(&mut data, "GB1");
        push_pascal(&mut data, "US1");
        push_pascal(&mut data, "EDU");
        push_pascal(&mut data, "KIT");

        let script = VersionScript::decode(&data).unwrap();
        assert_eq!(script.version_codes, vec!["GB1", "US1"]);
        assert_eq!(script.version_modes, vec!["EDU", "KIT"]);
    }

    #[test]
    fn decodes_text_script_and_resolves_ids() {
        let mut data = vec![1u8];
        push_pascal(&mut data, "English");
        data.extend_from_slice(&3u16.to_le_bytes());
        push_pascal(&mut data, "THE VALLEY/");
        push_pascal(&mut data, "LESSON 1");
        push_pascal(&mut data, "LESSON 2");

        let script = TextScript::decode(&data).unwrap();
        assert_eq!(script.language_names, vec!["English"]);
        assert_eq!(script.text(0), Some("THE VALLEY/"));
        assert_eq!(script.text(2), Some("LESSON 2"));
        assert_eq!(script.text(3), None);
    }

    #[test]
    fn accented_text_survives_decoding() {
        let mut data = vec![1u8];
        data.push(8); // "Français" in CP437
        data.extend_from_slice(b"Fran\x87ais");
        data.extend_from_slice(&1u16.to_le_bytes());
        data.push(8);
        data.extend_from_slice(b"LE PR\x90/\x82"); // É and é

        let script = TextScript::decode(&data).unwrap();
        assert_eq!(script.language_names, vec!["Français"]);
        assert_eq!(script.text(0), Some("LE PRÉ/é"));
    }

    #[test]
    fn decodes_words_script() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_le_bytes());
        push_pascal(&mut data, "jump");
        push_pascal(&mut data, "run");

        let script = WordsScript::decode(&data).unwrap();
        assert_eq!(script.words, vec!["jump", "run"]);
    }

    #[test]
    fn decodes_sample_names_script() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(b"SPLASH\0\0\0");
        data.extend_from_slice(b"DING\0\0\0\0\0");

        let script = SampleNamesScript::decode(&data).unwrap();
        assert_eq!(script.names, vec!["SPLASH", "DING"]);
    }

    fn encode_world_info(
        data: &mut Vec<u8>,
        x_position: u16,
        links: &[&[[u8; 5]]; 5],
        variants: [[u8; 5]; 5],
        demo: u8,
    ) {
        data.extend_from_slice(&4u16.to_le_bytes()); // world name id
        data.extend_from_slice(&5u16.to_le_bytes()); // level name id
        data.extend_from_slice(&x_position.to_le_bytes());
        data.extend_from_slice(&20u16.to_le_bytes()); // y position
        data.push(1); // type
        data.push(2); // world
        data.push(3); // lives
        for list in links {
            data.push(list.len() as u8);
            for entry in *list {
                data.extend_from_slice(entry);
            }
        }
        for row in variants {
            data.extend_from_slice(&row);
        }
        data.push(demo);
    }

    #[test]
    fn decodes_world_map_script() {
        let mut data = vec![1u8];
        let first_list: &[[u8; 5]] = &[[7, 0xFF, 0xFF, 0xFF, 0xFF], [8, 0xFF, 0xFF, 0xFF, 0xFF]];
        let empty: &[[u8; 5]] = &[];
        encode_world_info(
            &mut data,
            100,
            &[first_list, empty, empty, empty, empty],
            [[0; 5]; 5],
            0xFF,
        );

        let script = WorldMapScript::decode(&data).unwrap();
        assert_eq!(script.map_define.len(), 1);
        let info = &script.map_define[0];
        assert_eq!(info.world_name, 4);
        assert_eq!(info.level_name, 5);
        assert_eq!(info.x_position, 100);
        assert_eq!(info.lives_count, 3);
        assert_eq!(info.level_links[0].len(), 2);
        assert_eq!(info.level_links[0][0].level_variants[0], Some(7));
        assert_eq!(info.level_links[0][0].level_variants[1], None);
        assert_eq!(info.level_links[0][1].level_variants[0], Some(8));
        assert!(info.level_links[1].is_empty());
        assert_eq!(info.running_demo, None);
        assert!(!info.has_level_variants());
    }

    #[test]
    fn flags_populated_level_variants() {
        let mut data = vec![1u8];
        let empty: &[[u8; 5]] = &[];
        let mut variants = [[0u8; 5]; 5];
        variants[2][1] = 9;
        encode_world_info(&mut data, 50, &[empty; 5], variants, 3);

        let script = WorldMapScript::decode(&data).unwrap();
        let info = &script.map_define[0];
        assert!(info.has_level_variants());
        assert_eq!(info.running_demo, Some(3));
    }

    #[test]
    fn truncated_script_is_a_format_error() {
        let data = vec![5u8, 4, b'G', b'B'];
        let err = VersionScript::decode(&data).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "unexpected error: {err}");
    }
}
