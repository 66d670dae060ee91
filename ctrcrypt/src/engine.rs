use crate::{keys, Error, KeySlotStore, NcchInfoEntry};
use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Counter-mode block cipher capability used by [`Engine::decrypt_with`].
///
/// One call applies the keystream for an entire buffer; the implementation
/// owns per-block counter advancement (+1 per 16-byte block, big-endian,
/// matching [`crate::math`]'s byte order). Failures are surfaced unchanged
/// and never retried: given fixed inputs the outcome is deterministic.
pub trait CtrCipher {
    fn apply(&self, key: &[u8; 16], counter: &[u8; 16], data: &mut [u8]) -> Result<(), Error>;
}

/// The built-in AES-128-CTR primitive.
#[derive(Debug, Default)]
pub struct AesCtr;

impl CtrCipher for AesCtr {
    fn apply(&self, key: &[u8; 16], counter: &[u8; 16], data: &mut [u8]) -> Result<(), Error> {
        let mut cipher = Aes128Ctr::new(key.into(), counter.into());
        cipher.apply_keystream(data);
        Ok(())
    }
}

/// One decryption unit, produced by [`Engine::job`] and consumed exactly
/// once.
///
/// Jobs are self-contained value objects: independent jobs may be processed
/// in any order, including in parallel.
#[derive(Debug, Clone)]
pub struct DecryptionJob {
    pub counter: [u8; 16],
    pub key_x: [u8; 16],
    pub key_y: [u8; 16],
    pub title_id: [u8; 8],
    pub output_name: String,
    pub size_mb: u32,
    pub uses_seed_crypto: bool,
    pub uses_new_crypto: bool,
}

/// Holds the generator constant and the key slot table for one
/// configuration.
///
/// Engines are plain values; several (say, a production one and a test
/// fixture) can coexist in a process.
#[derive(Debug)]
pub struct Engine {
    constant: [u8; 16],
    slots: KeySlotStore,
}

impl Engine {
    pub fn new(constant: [u8; 16]) -> Self {
        Self {
            constant,
            slots: KeySlotStore::new(),
        }
    }

    /// Engine with the generator constant given as hex text.
    pub fn from_hex(constant: &str) -> Result<Self, Error> {
        Ok(Self::new(keys::parse_key(constant)?))
    }

    pub fn write_key_x(&mut self, slot: u8, key: &[u8]) -> Result<(), Error> {
        self.slots.write_key_x(slot, key)
    }

    pub fn write_key_y(&mut self, slot: u8, key: &[u8]) -> Result<(), Error> {
        self.slots.write_key_y(slot, key)
    }

    /// Normal key currently derivable for `slot`.
    pub fn normal_key(&self, slot: u8) -> Result<[u8; 16], Error> {
        let (key_x, key_y) = self.slots.read_pair(slot)?;
        keys::scramble(&key_x, &key_y, &self.constant)
    }

    /// Turn a parsed descriptor entry into a self-contained job.
    ///
    /// The entry's KeyY is written into the slot its crypto flags select;
    /// that slot's KeyX must already be provisioned.
    pub fn job(&mut self, entry: &NcchInfoEntry) -> Result<DecryptionJob, Error> {
        let slot = entry.key_slot();
        self.slots.write_key_y(slot, &entry.key_y)?;
        let (key_x, key_y) = self.slots.read_pair(slot)?;
        Ok(DecryptionJob {
            counter: entry.counter,
            key_x,
            key_y,
            title_id: entry.title_id,
            output_name: entry.output_name.clone(),
            size_mb: entry.size_mb,
            uses_seed_crypto: entry.uses_seed_crypto,
            uses_new_crypto: entry.uses_new_crypto,
        })
    }

    /// Decrypt `data` in place with a caller-supplied counter-mode
    /// primitive.
    pub fn decrypt_with<C: CtrCipher>(
        &self,
        job: &DecryptionJob,
        cipher: &C,
        data: &mut [u8],
    ) -> Result<(), Error> {
        let normal_key = keys::scramble(&job.key_x, &job.key_y, &self.constant)?;
        cipher.apply(&normal_key, &job.counter, data)
    }

    /// Decrypt `data` in place with the built-in AES-128-CTR primitive.
    pub fn decrypt(&self, job: &DecryptionJob, data: &mut [u8]) -> Result<(), Error> {
        self.decrypt_with(job, &AesCtr, data)
    }
}
