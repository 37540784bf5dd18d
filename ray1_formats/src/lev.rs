use crate::error::{ensure_format, Result};
use crate::reader::Reader;

/// Edge length of one map tile in pixels.
pub const TILE_SIZE: usize = 16;

/// Number of palette indices in one tile texture.
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;

/// Transparency-mode tag that forces every pixel of a texture to render
/// fully transparent, whatever the variant or alpha mask says.
pub const TRANSPARENCY_FORCED: u32 = 0xAAAA_AAAA;

/// One cell of the map grid, referencing a tile texture by index into the
/// level's offset table. Index 0 is a reserved sentinel meaning "no tile".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub tile_index: u16,
}

/// Variant-specific part of a tile texture. Only transparent textures carry
/// a per-pixel alpha mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureKind {
    Opaque,
    Transparent { alpha: [u8; TILE_PIXELS] },
}

/// A 16x16 indexed-color tile texture.
///
/// `offset` is an address-like key: blocks reach their texture by looking
/// their tile index up in the level's offset table and matching the result
/// against this field. It is never dereferenced as a real file offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTexture {
    pub offset: u32,
    pub transparency_mode: u32,
    pub pixel_indices: [u8; TILE_PIXELS],
    pub kind: TextureKind,
}

impl BlockTexture {
    pub fn is_forced_transparent(&self) -> bool {
        self.transparency_mode == TRANSPARENCY_FORCED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// 256-entry color lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub colors: [PaletteColor; 256],
}

/// A fully decoded level map.
///
/// Invariants established by [`LevelMap::decode`]: `blocks.len()` equals
/// `width * height`, and `palettes` holds at least one entry. The two
/// texture tables preserve source order; resolution tie-breaking depends
/// on it (see [`crate::render::TextureLookup`]).
#[derive(Debug, Clone)]
pub struct LevelMap {
    pub width: u16,
    pub height: u16,
    pub blocks: Vec<Block>,
    pub opaque_textures: Vec<BlockTexture>,
    pub transparent_textures: Vec<BlockTexture>,
    pub offset_table: Vec<u32>,
    pub palettes: Vec<Palette>,
}

impl LevelMap {
    /// Decodes a `.lev` payload. Layout, in order: header (width, height),
    /// block grid, opaque texture table, transparent texture table, offset
    /// table, palette table. All integers little-endian.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes, "level map");

        let width = reader.u16("map width")?;
        let height = reader.u16("map height")?;
        ensure_format!(
            width > 0 && height > 0,
            "level map reports zero dimension ({width}x{height})"
        );

        let block_count = width as usize * height as usize;
        ensure_format!(
            reader.remaining() >= block_count * 2,
            "level map block grid truncated ({block_count} blocks declared, {} bytes left)",
            reader.remaining()
        );
        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            blocks.push(Block {
                tile_index: reader.u16("block tile index")?,
            });
        }

        let opaque_count = reader.u16("opaque texture count")? as usize;
        let mut opaque_textures = Vec::with_capacity(opaque_count);
        for _ in 0..opaque_count {
            opaque_textures.push(decode_texture(&mut reader, false)?);
        }

        let transparent_count = reader.u16("transparent texture count")? as usize;
        let mut transparent_textures = Vec::with_capacity(transparent_count);
        for _ in 0..transparent_count {
            transparent_textures.push(decode_texture(&mut reader, true)?);
        }

        let offset_count = reader.u16("offset table length")? as usize;
        let mut offset_table = Vec::with_capacity(offset_count);
        for _ in 0..offset_count {
            offset_table.push(reader.u32("texture offset")?);
        }

        let palette_count = reader.u16("palette count")? as usize;
        ensure_format!(palette_count >= 1, "level map declares no palettes");
        let mut palettes = Vec::with_capacity(palette_count);
        for _ in 0..palette_count {
            palettes.push(decode_palette(&mut reader)?);
        }

        Ok(LevelMap {
            width,
            height,
            blocks,
            opaque_textures,
            transparent_textures,
            offset_table,
            palettes,
        })
    }

    pub fn pixel_width(&self) -> usize {
        self.width as usize * TILE_SIZE
    }

    pub fn pixel_height(&self) -> usize {
        self.height as usize * TILE_SIZE
    }
}

fn decode_texture(reader: &mut Reader<'_>, transparent: bool) -> Result<BlockTexture> {
    let offset = reader.u32("texture offset key")?;
    let transparency_mode = reader.u32("texture transparency mode")?;
    let pixel_indices = reader.array::<TILE_PIXELS>("texture pixel indices")?;
    let kind = if transparent {
        TextureKind::Transparent {
            alpha: reader.array::<TILE_PIXELS>("texture alpha mask")?,
        }
    } else {
        TextureKind::Opaque
    };

    Ok(BlockTexture {
        offset,
        transparency_mode,
        pixel_indices,
        kind,
    })
}

fn decode_palette(reader: &mut Reader<'_>) -> Result<Palette> {
    let mut colors = [PaletteColor {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0,
    }; 256];
    for color in colors.iter_mut() {
        let [red, green, blue, alpha] = reader.array::<4>("palette color")?;
        *color = PaletteColor {
            red,
            green,
            blue,
            alpha,
        };
    }
    Ok(Palette { colors })
}
