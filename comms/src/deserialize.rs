use std::io;

/// Builds a value out of the payload of a single frame.
pub trait Deserialize<'a>: Sized {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self>;
}

impl<'a> Deserialize<'a> for &'a str {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        std::str::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}
