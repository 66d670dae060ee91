use byteorder::{ReadBytesExt, LE};

pub trait ReadExt {
    fn read_flag(&mut self) -> Result<bool, super::Error>;
    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], super::Error>;
}

impl<R: std::io::Read> ReadExt for R {
    /// Boolean stored as a little-endian u32; anything besides 0/1 is
    /// rejected.
    fn read_flag(&mut self) -> Result<bool, super::Error> {
        match self.read_u32::<LE>()? {
            1 => Ok(true),
            0 => Ok(false),
            err => Err(super::Error::Flag(err)),
        }
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], super::Error> {
        let mut buf = [0; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}
