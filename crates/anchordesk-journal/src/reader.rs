//! Sequential reading and seal-checking of trail frames.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::errors::TrailError;
use crate::event::AuditEvent;
use crate::frame::{self, FrameHead, FrameKind, FRAME_HEAD_LEN, PREAMBLE_LEN};

/// How a reader treats a torn tail frame.
///
/// Every frame's seal is checked in both modes; a seal mismatch is
/// tampering and always surfaces as an error. The modes differ only on
/// truncation, which a crash mid-append produces legitimately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// A torn tail is an error.
    Strict,
    /// A torn tail ends the trail; the frames before it are returned.
    Permissive,
}

/// Sequential reader for the closure audit trail.
pub struct TrailReader {
    input: BufReader<File>,
    mode: ReadMode,
    offset: u64,
}

impl TrailReader {
    /// Opens a trail file and validates its preamble.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, TrailError> {
        let mut input = BufReader::new(File::open(path)?);
        let mut preamble = [0u8; PREAMBLE_LEN];
        let got = fill(&mut input, &mut preamble)?;
        frame::decode_preamble(&preamble[..got])?;
        Ok(Self {
            input,
            mode,
            offset: PREAMBLE_LEN as u64,
        })
    }

    /// Byte offset of the next unread frame.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads the next frame, verifying its seal.
    ///
    /// Returns `Ok(None)` at the end of the trail, or at a torn tail in
    /// permissive mode.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, TrailError> {
        let head_offset = self.offset;

        let mut head_bytes = [0u8; FRAME_HEAD_LEN];
        let got = fill(&mut self.input, &mut head_bytes)?;
        if got == 0 {
            return Ok(None);
        }
        if got < FRAME_HEAD_LEN {
            return self.torn(head_offset);
        }
        let head = FrameHead::decode(&head_bytes)?;
        self.offset += FRAME_HEAD_LEN as u64;

        let mut payload = vec![0u8; head.len as usize];
        let got = fill(&mut self.input, &mut payload)?;
        if got < payload.len() {
            return self.torn(head_offset);
        }
        self.offset += head.len as u64;

        if !head.seal.covers(head.kind, &payload) {
            return Err(TrailError::SealMismatch {
                offset: head_offset,
            });
        }
        Ok(Some((head.kind, payload)))
    }

    /// Reads the next audit event, skipping frame kinds this version does
    /// not understand. Returns `Ok(None)` at the end of the trail.
    pub fn read_event(&mut self) -> Result<Option<AuditEvent>, TrailError> {
        while let Some((kind, payload)) = self.read_frame()? {
            if kind == FrameKind::Event {
                let text = std::str::from_utf8(&payload)?;
                return Ok(Some(serde_json::from_str(text)?));
            }
        }
        Ok(None)
    }

    fn torn<T>(&self, offset: u64) -> Result<Option<T>, TrailError> {
        match self.mode {
            ReadMode::Permissive => Ok(None),
            ReadMode::Strict => Err(TrailError::TruncatedFrame { offset }),
        }
    }
}

/// Reads until `buf` is full or the input ends; returns the bytes read.
fn fill(input: &mut impl Read, buf: &mut [u8]) -> Result<usize, TrailError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = input.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
