use std::collections::HashMap;

use crate::lev::{BlockTexture, LevelMap, TextureKind, TILE_SIZE};

/// Resolves block tile indices to textures for one level.
///
/// The games match a block's offset key against the first texture with that
/// key in the opaque table, then the transparent table. The lookup here is
/// built by inserting opaque-then-transparent entries and keeping the first
/// texture per key, which preserves that tie-break exactly while replacing
/// the per-block linear scan with a map hit.
pub struct TextureLookup<'a> {
    offset_table: &'a [u32],
    by_offset: HashMap<u32, &'a BlockTexture>,
}

impl<'a> TextureLookup<'a> {
    pub fn build(level: &'a LevelMap) -> Self {
        let mut by_offset: HashMap<u32, &'a BlockTexture> = HashMap::with_capacity(
            level.opaque_textures.len() + level.transparent_textures.len(),
        );
        for texture in level
            .opaque_textures
            .iter()
            .chain(level.transparent_textures.iter())
        {
            by_offset.entry(texture.offset).or_insert(texture);
        }

        TextureLookup {
            offset_table: &level.offset_table,
            by_offset,
        }
    }

    /// Tile index 0 is the "no tile" sentinel and never consults the offset
    /// table. A tile index outside the table, or an offset key no texture
    /// carries, is a valid transparent-tile outcome, not an error.
    pub fn resolve(&self, tile_index: u16) -> Option<&'a BlockTexture> {
        if tile_index == 0 {
            return None;
        }
        let offset = self.offset_table.get(tile_index as usize)?;
        self.by_offset.get(offset).copied()
    }
}

/// Renders a level to a tightly packed RGBA8 buffer of
/// `(width*16) x (height*16)` pixels.
///
/// Tiles are visited row-major, and pixels row-major within each tile.
/// Unresolved blocks, tile index 0, and textures tagged with the forced
/// transparency mode all come out as (0,0,0,0). Everything else samples
/// palette 0 at the inverted pixel index, with the alpha mask supplying
/// alpha for transparent-variant textures. Pure function of the level.
pub fn render_level(level: &LevelMap) -> Vec<u8> {
    let full_width = level.pixel_width();
    let full_height = level.pixel_height();
    let mut rgba = vec![0u8; full_width * full_height * 4];

    let lookup = TextureLookup::build(level);
    let palette = &level.palettes[0];

    for tile_y in 0..level.height as usize {
        for tile_x in 0..level.width as usize {
            let block = level.blocks[tile_y * level.width as usize + tile_x];
            let Some(texture) = lookup.resolve(block.tile_index) else {
                continue;
            };
            if texture.is_forced_transparent() {
                // The buffer starts zeroed, so skipping emits (0,0,0,0).
                continue;
            }

            for y in 0..TILE_SIZE {
                for x in 0..TILE_SIZE {
                    let tile_offset = y * TILE_SIZE + x;
                    let color = palette.colors[255 - texture.pixel_indices[tile_offset] as usize];
                    let alpha = match &texture.kind {
                        TextureKind::Transparent { alpha } => alpha[tile_offset],
                        TextureKind::Opaque => color.alpha,
                    };

                    let absolute_x = tile_x * TILE_SIZE + x;
                    let absolute_y = tile_y * TILE_SIZE + y;
                    let base = (absolute_y * full_width + absolute_x) * 4;
                    rgba[base] = color.red;
                    rgba[base + 1] = color.green;
                    rgba[base + 2] = color.blue;
                    rgba[base + 3] = alpha;
                }
            }
        }
    }

    rgba
}
