use crate::error::{NetlogError, Result};
use bytes::{BufMut, BytesMut};

// File mode constants
const S_IFMT: u32 = 0o170000;
const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;

/// Largest payload the sync service accepts in one DATA packet
pub const SYNC_MAX_CHUNK: usize = 64 * 1024;

/// Sync protocol commands
pub mod sync {
    pub const DATA: &[u8; 4] = b"DATA";
    pub const DONE: &[u8; 4] = b"DONE";
    pub const SEND: &[u8; 4] = b"SEND";
    pub const RECV: &[u8; 4] = b"RECV";
    pub const STAT: &[u8; 4] = b"STAT";
    pub const QUIT: &[u8; 4] = b"QUIT";
    pub const OKAY: &[u8; 4] = b"OKAY";
    pub const FAIL: &[u8; 4] = b"FAIL";
}

/// Sync protocol framing: a 4-byte id followed by a little-endian u32
pub struct SyncProtocol;

impl SyncProtocol {
    /// Encode a request carrying a path (or any string) payload
    pub fn request(id: &[u8; 4], payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::with_capacity(8 + payload.len());
        buf.put_slice(id);
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(payload);
        buf
    }

    /// SEND takes `path,mode` with the mode in decimal
    pub fn send_request(remote_path: &str, mode: u32) -> BytesMut {
        let target = format!("{},{}", remote_path, mode);
        Self::request(sync::SEND, target.as_bytes())
    }

    pub fn data_packet(chunk: &[u8]) -> Result<BytesMut> {
        if chunk.len() > SYNC_MAX_CHUNK {
            return Err(NetlogError::FileTransfer(format!(
                "Chunk of {} bytes exceeds sync limit",
                chunk.len()
            )));
        }
        Ok(Self::request(sync::DATA, chunk))
    }

    /// DONE reuses the length slot for the file mtime
    pub fn done_packet(mtime: u32) -> BytesMut {
        let mut buf = BytesMut::with_capacity(8);
        buf.put_slice(sync::DONE);
        buf.put_u32_le(mtime);
        buf
    }

    /// Split an 8-byte packet header into id and length
    pub fn parse_header(header: &[u8; 8]) -> ([u8; 4], u32) {
        let id = [header[0], header[1], header[2], header[3]];
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        (id, len)
    }
}

/// Reply to a v1 STAT request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStat {
    mode: u32,
    size: u32,
    mtime: u32,
}

impl SyncStat {
    pub const LEN: usize = 16;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(NetlogError::AdbProtocol(format!(
                "Invalid stat response length: {}",
                bytes.len()
            )));
        }
        if &bytes[0..4] != sync::STAT {
            return Err(NetlogError::AdbProtocol(format!(
                "Invalid stat magic: {:?}",
                String::from_utf8_lossy(&bytes[0..4])
            )));
        }

        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Ok(Self {
            mode: word(4),
            size: word(8),
            mtime: word(12),
        })
    }

    /// adbd reports an all-zero stat for paths that do not exist
    pub fn exists(&self) -> bool {
        self.mode != 0
    }

    pub fn is_file(&self) -> bool {
        (self.mode & S_IFMT) == S_IFREG
    }

    pub fn is_dir(&self) -> bool {
        (self.mode & S_IFMT) == S_IFDIR
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn mtime(&self) -> u32 {
        self.mtime
    }
}
