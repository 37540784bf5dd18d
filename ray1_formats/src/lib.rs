pub mod dat;
pub mod error;
pub mod fingerprint;
pub mod lev;
pub mod render;
pub mod script;
pub mod wav;

mod reader;

pub use dat::{DatArchive, DatEntry};
pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use lev::{Block, BlockTexture, LevelMap, Palette, PaletteColor, TextureKind, TILE_SIZE};
pub use render::{render_level, TextureLookup};
pub use script::{
    LevelLinkEntry, SampleNamesScript, TextScript, VersionScript, WordsScript, WorldInfo,
    WorldMapScript,
};
pub use wav::wrap_pcm_mono8;
