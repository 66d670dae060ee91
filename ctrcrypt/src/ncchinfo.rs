//! ncchinfo.bin descriptor parsing.
//!
//! File layout, all integers little-endian:
//!
//! ```text
//! header (16 bytes):
//!   4 bytes   0xFFFFFFFF, rejects the file from older pad generators
//!   4 bytes   version or'd with 0xF0000000; low 28 bits must be 4
//!   4 bytes   number of entries
//!   4 bytes   reserved
//!
//! entry (168 bytes):
//!   16 bytes  counter
//!   16 bytes  KeyY
//!    4 bytes  size in MB (rounded up)
//!    4 bytes  reserved
//!    4 bytes  uses 9x seed crypto (0 or 1)
//!    4 bytes  uses 7x crypto (0 or 1)
//!    8 bytes  title ID
//!  112 bytes  output file name in UTF-8, NUL padded
//! ```

use crate::ext::ReadExt;
use crate::{keys, Error, MAGIC, VERSION};
use byteorder::{ReadBytesExt, LE};
use std::io;

pub const ENTRY_SIZE: usize = 168;

const HEADER_SIZE: usize = 16;
const NAME_SIZE: usize = 112;

#[derive(Debug)]
pub struct NcchInfo {
    pub version: u32,
    pub entries: Vec<NcchInfoEntry>,
}

#[derive(Debug, Clone)]
pub struct NcchInfoEntry {
    pub counter: [u8; 16],
    pub key_y: [u8; 16],
    pub size_mb: u32,
    pub uses_seed_crypto: bool,
    pub uses_new_crypto: bool,
    pub title_id: [u8; 8],
    pub output_name: String,
}

impl NcchInfo {
    /// Parse a whole descriptor file.
    ///
    /// Entries come back in file order. Parsing is a single forward pass
    /// that stops at the first malformed entry; callers never see a
    /// partially valid list.
    pub fn parse(buffer: &[u8]) -> Result<Self, Error> {
        let mut reader = buffer;

        let magic = reader.read_u32::<LE>()?;
        if magic != MAGIC {
            return Err(Error::Magic(magic));
        }
        let version = reader.read_u32::<LE>()? & 0x0FFFFFFF;
        if version != VERSION {
            return Err(Error::Version(version));
        }
        let entry_count = reader.read_u32::<LE>()?;
        let _reserved = reader.read_u32::<LE>()?;

        // reject a lying header before reading (or allocating for) entries
        let payload = buffer.len().saturating_sub(HEADER_SIZE) as u64;
        if entry_count as u64 * ENTRY_SIZE as u64 > payload {
            return Err(Error::Truncated);
        }

        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(NcchInfoEntry::read(&mut reader)?);
        }
        Ok(Self { version, entries })
    }
}

impl NcchInfoEntry {
    pub fn read<R: io::Read>(reader: &mut R) -> Result<Self, Error> {
        let counter = reader.read_bytes()?;
        let key_y = reader.read_bytes()?;
        let size_mb = reader.read_u32::<LE>()?;
        let _reserved = reader.read_u32::<LE>()?;
        let uses_seed_crypto = reader.read_flag()?;
        let uses_new_crypto = reader.read_flag()?;
        let title_id = reader.read_bytes()?;

        let name: [u8; NAME_SIZE] = reader.read_bytes()?;
        // strip trailing NUL padding only; interior bytes stay verbatim
        let end = name.iter().rposition(|&b| b != 0).ok_or(Error::EmptyName)? + 1;
        let output_name = String::from_utf8(name[..end].to_vec())?;

        Ok(Self {
            counter,
            key_y,
            size_mb,
            uses_seed_crypto,
            uses_new_crypto,
            title_id,
            output_name,
        })
    }

    /// Hardware key slot this entry's content is keyed under.
    pub fn key_slot(&self) -> u8 {
        if self.uses_new_crypto {
            keys::SLOT_7X
        } else {
            keys::SLOT_ORIGINAL
        }
    }
}
