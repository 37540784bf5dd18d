use std::collections::HashSet;
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use crate::error::{ensure_format, format_err, Error, Result};
use crate::reader::Reader;

/// Width of the fixed name field in a directory record. The games use
/// 8.3-truncated upper-case entry names (`TEXT`, `WLDMAP01`, `SMPNAMES`),
/// stored NUL-padded with a terminator byte.
const NAME_FIELD_LEN: usize = 9;
const DIRECTORY_RECORD_LEN: usize = NAME_FIELD_LEN + 4 + 4;

/// One named file inside a `.DAT` archive.
#[derive(Debug, Clone)]
pub struct DatEntry {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

impl DatEntry {
    pub fn data_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        let end = start + self.size as usize;
        start..end
    }
}

/// A `.DAT` named-entry container (`COMMON.DAT`, `SPECIAL.DAT`,
/// `SNDSMP.DAT`). The directory is parsed eagerly; entry payloads are
/// served as slices of the memory-mapped source. Nothing is mutated after
/// `open`, so concurrent reads through `&self` are safe.
#[derive(Debug)]
pub struct DatArchive {
    path: PathBuf,
    mmap: Mmap,
    entries: Vec<DatEntry>,
}

impl DatArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf)?;
        let mmap = unsafe { MmapOptions::new().map(&file) }?;

        let entries = parse_directory(&mmap)?;

        Ok(DatArchive {
            path: path_buf,
            mmap,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[DatEntry] {
        &self.entries
    }

    pub fn find_entry(&self, name: &str) -> Option<&DatEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Like [`find_entry`](Self::find_entry) but a missing name is an error
    /// carrying the archive path for reporting.
    pub fn entry(&self, name: &str) -> Result<&DatEntry> {
        self.find_entry(name)
            .ok_or_else(|| Error::not_found(self.path.display().to_string(), name))
    }

    pub fn read_entry(&self, name: &str) -> Result<&[u8]> {
        let entry = self.entry(name)?;
        Ok(self.read_entry_bytes(entry))
    }

    pub fn read_entry_bytes(&self, entry: &DatEntry) -> &[u8] {
        &self.mmap[entry.data_range()]
    }
}

fn parse_directory(bytes: &[u8]) -> Result<Vec<DatEntry>> {
    let mut reader = Reader::new(bytes, "DAT archive");
    let entry_count = reader.u16("entry count")? as usize;

    let directory_len = entry_count * DIRECTORY_RECORD_LEN;
    ensure_format!(
        reader.remaining() >= directory_len,
        "DAT archive directory truncated ({} entries declared, {} bytes left)",
        entry_count,
        reader.remaining()
    );

    let mut seen: HashSet<String> = HashSet::with_capacity(entry_count);
    let mut entries = Vec::with_capacity(entry_count);

    for index in 0..entry_count {
        let name = reader.fixed_name::<NAME_FIELD_LEN>("entry name")?;
        let offset = reader.u32("entry offset")?;
        let size = reader.u32("entry size")?;

        ensure_format!(!name.is_empty(), "DAT entry {index} has an empty name");
        ensure_format!(
            seen.insert(name.to_ascii_uppercase()),
            "DAT entry {index} duplicates name {name:?}"
        );

        let end = (offset as usize)
            .checked_add(size as usize)
            .ok_or_else(|| format_err!("DAT entry {index} ({name:?}) size overflow"))?;
        ensure_format!(
            end <= bytes.len(),
            "DAT entry {index} ({name:?}) data extends beyond the archive ({} > {})",
            end,
            bytes.len()
        );

        entries.push(DatEntry { name, offset, size });
    }

    Ok(entries)
}
