use crate::{math, Error};

/// Key slot used for original-generation NCCH content.
pub const SLOT_ORIGINAL: u8 = 0x2C;

/// Key slot used when an entry's alternate-generation crypto flag is set.
pub const SLOT_7X: u8 = 0x25;

/// Parse 32 hex digits of key material into 16 bytes.
pub fn parse_key(s: &str) -> Result<[u8; 16], Error> {
    let bytes = hex::decode(s.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::KeyLength(bytes.len()))
}

/// Hardware key scrambler:
/// `F(KeyX, KeyY) = (((KeyX <<< 2) ^ KeyY) + c) <<< 87`.
///
/// This is the only way a usable cipher key is ever produced. A formula
/// deviation does not error anywhere; it just yields a key that decrypts
/// valid ciphertext into garbage, so the ordering of the rotate/XOR/add
/// steps here is exercised against known-answer vectors in the tests.
pub fn scramble(key_x: &[u8], key_y: &[u8], c: &[u8]) -> Result<[u8; 16], Error> {
    for key in [key_x, key_y, c] {
        if key.len() != 16 {
            return Err(Error::KeyLength(key.len()));
        }
    }
    let mixed = math::xor(&math::rotate_left(key_x, 2), key_y)?;
    let normal = math::rotate_left(&math::sum(&mixed, c)?, 87);
    Ok(normal.try_into().expect("operands are 16 bytes"))
}

/// Table of per-slot KeyX/KeyY halves, indexed by the 8-bit slot id.
///
/// Either half of a slot may be provisioned independently and rewritten at
/// any time; there is no removal. Reading requires both halves.
pub struct KeySlotStore {
    key_x: [Option<[u8; 16]>; 256],
    key_y: [Option<[u8; 16]>; 256],
}

impl Default for KeySlotStore {
    fn default() -> Self {
        Self {
            key_x: [None; 256],
            key_y: [None; 256],
        }
    }
}

impl KeySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_key_x(&mut self, slot: u8, key: &[u8]) -> Result<(), Error> {
        self.key_x[slot as usize] = Some(check_key(key)?);
        Ok(())
    }

    pub fn write_key_y(&mut self, slot: u8, key: &[u8]) -> Result<(), Error> {
        self.key_y[slot as usize] = Some(check_key(key)?);
        Ok(())
    }

    /// Current (KeyX, KeyY) pair for `slot`; fails unless both halves have
    /// been written.
    pub fn read_pair(&self, slot: u8) -> Result<([u8; 16], [u8; 16]), Error> {
        match (self.key_x[slot as usize], self.key_y[slot as usize]) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(Error::SlotNotProvisioned(slot)),
        }
    }
}

impl std::fmt::Debug for KeySlotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let provisioned: Vec<usize> = (0..256)
            .filter(|&i| self.key_x[i].is_some() || self.key_y[i].is_some())
            .collect();
        f.debug_struct("KeySlotStore")
            .field("slots", &provisioned)
            .finish()
    }
}

fn check_key(key: &[u8]) -> Result<[u8; 16], Error> {
    key.try_into().map_err(|_| Error::KeyLength(key.len()))
}
