use crate::error::{ensure_format, Result};

/// Bounds-checked little-endian cursor over a byte slice.
///
/// Every read names the structure and field being decoded so a truncated
/// file fails with enough context to locate the bad asset.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8], what: &'static str) -> Self {
        Reader {
            bytes,
            pos: 0,
            what,
        }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        ensure_format!(
            self.remaining() >= len,
            "{} truncated at offset {} while reading {} ({} bytes needed, {} left)",
            self.what,
            self.pos,
            field,
            len,
            self.remaining()
        );
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub fn u16(&mut self, field: &str) -> Result<u16> {
        let bytes = self.take(2, field)?;
        Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn u32(&mut self, field: &str) -> Result<u32> {
        let bytes = self.take(4, field)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N]> {
        let bytes = self.take(N, field)?;
        Ok(bytes.try_into().unwrap())
    }

    /// One-byte length prefix followed by that many character bytes.
    pub fn pascal_string(&mut self, field: &str) -> Result<String> {
        let len = self.u8(field)? as usize;
        let bytes = self.take(len, field)?;
        Ok(decode_text(bytes))
    }

    /// Fixed-width NUL-padded name field.
    pub fn fixed_name<const N: usize>(&mut self, field: &str) -> Result<String> {
        let bytes = self.take(N, field)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(N);
        Ok(decode_text(&bytes[..end]))
    }
}

/// The games store text as DOS code page 437 single-byte characters;
/// localized volumes rely on the high half for accented letters, so every
/// byte maps to its CP437 code point rather than through UTF-8.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| cp437_char(byte)).collect()
}

fn cp437_char(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        CP437_HIGH[(byte - 0x80) as usize]
    }
}

/// Code points for CP437 bytes 0x80..=0xFF.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];
