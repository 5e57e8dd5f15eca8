//! Appending sealed frames to a trail file.

use std::fs::OpenOptions;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use crate::errors::TrailError;
use crate::event::AuditEvent;
use crate::frame::{self, FrameHead, FrameKind, PREAMBLE_LEN};

/// Options for trail writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: true — the trail is
    /// audit evidence and losing tail entries defeats its purpose).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: true,
            create: true,
        }
    }
}

/// Append-only writer for the closure audit trail.
///
/// Opening an existing file validates its preamble and positions at the
/// end; the trail is never truncated or rewritten. Each appended frame
/// carries its own content seal.
pub struct TrailWriter {
    file: std::fs::File,
    sync: bool,
}

impl TrailWriter {
    /// Opens or creates a trail file for appending.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, TrailError> {
        let mut file = OpenOptions::new()
            .create(options.create)
            .read(true)
            .write(true)
            .open(path)?;

        if file.metadata()?.len() == 0 {
            file.write_all(&frame::encode_preamble())?;
        } else {
            let mut preamble = [0u8; PREAMBLE_LEN];
            file.rewind()?;
            file.read_exact(&mut preamble).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    TrailError::NotATrail("file is shorter than the preamble".into())
                } else {
                    TrailError::Io(e)
                }
            })?;
            frame::decode_preamble(&preamble)?;
            file.seek(io::SeekFrom::End(0))?;
        }

        let writer = Self {
            file,
            sync: options.sync,
        };
        writer.commit()?;
        Ok(writer)
    }

    /// Appends a sealed audit event to the trail.
    pub fn append_event(&mut self, event: &AuditEvent) -> Result<(), TrailError> {
        let payload = serde_json::to_vec(event)?;
        self.append_frame(FrameKind::Event, &payload)
    }

    /// Appends one frame of the given kind.
    pub fn append_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), TrailError> {
        let head = FrameHead::for_payload(kind, payload)?;
        self.file.write_all(&head.encode())?;
        self.file.write_all(payload)?;
        self.commit()
    }

    fn commit(&self) -> Result<(), TrailError> {
        (&self.file).flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Flushes and closes the trail.
    pub fn finish(self) -> Result<(), TrailError> {
        self.commit()
    }
}

impl Drop for TrailWriter {
    fn drop(&mut self) {
        let _ = self.commit();
    }
}
