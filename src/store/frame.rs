//! Framing primitives shared by the store and index files
//!
//! All integers are little-endian. Strings are a `u16` byte length
//! followed by UTF-8 bytes.
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Payload          | (Record Length bytes)
//! +------------------+
//! ```

use std::io::{self, Read, Write};

/// Size of the length prefix in front of every record payload
pub const LENGTH_PREFIX_SIZE: u64 = 4;

pub(crate) fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16<R: Read>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Reads a `u16`-length-prefixed UTF-8 string.
pub(crate) fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let len = read_u16(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}

/// Appends a `u16`-length-prefixed string to a buffer.
pub(crate) fn put_string(buf: &mut Vec<u8>, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("String of {} bytes exceeds u16 length prefix", value.len()),
        )
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Writes one `[length][payload]` frame.
pub(crate) fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<u64> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Record of {} bytes exceeds u32 length prefix", payload.len()),
        )
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    Ok(LENGTH_PREFIX_SIZE + payload.len() as u64)
}

/// Reads a length prefix, distinguishing a clean or partial end of
/// stream (`Ok(None)`) from other read failures.
pub(crate) fn read_length_prefix<R: Read>(reader: &mut R) -> io::Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(None),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(Some(u32::from_le_bytes(buf)))
}
