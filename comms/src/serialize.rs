/// Turns a value into the payload of a single frame.
pub trait Serialize<'a> {
    /// Writes the serialized form of `self` into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The frame buffer, already holding the length header.
    ///
    /// # Returns
    /// Optionally, a borrowed tail to be written after `buf` without copying.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}

impl<'a> Serialize<'a> for str {
    fn serialize(&'a self, _buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        Some(self.as_bytes())
    }
}
