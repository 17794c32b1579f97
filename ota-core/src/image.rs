/// Streaming firmware image writer
///
/// Bytes coming off the network are forwarded to a [`FirmwareSink`] (the OTA
/// slot on the device, a `Vec` in tests) while the writer keeps a running
/// SHA-256 and enforces the size limits. Nothing here touches flash directly,
/// so the firmware only has to call `complete()` on the slot when
/// [`ImageWriter::verify`] returned `Ok`, and `abort()` otherwise.
use std::convert::Infallible;
use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::checksum::Sha256Digest;
use crate::progress::ProgressTracker;

/// Destination of the image bytes
pub trait FirmwareSink {
    type Error: fmt::Display;

    fn write_chunk(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl FirmwareSink for Vec<u8> {
    type Error = Infallible;

    fn write_chunk(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ImageError {
    #[error("image of {size} bytes exceeds the {max} byte slot")]
    TooLarge { size: usize, max: usize },
    #[error("server sent more than the announced {expected} bytes")]
    Overrun { expected: usize },
    #[error("image truncated: got {got} of {expected} bytes")]
    Truncated { expected: usize, got: usize },
    #[error("image is empty")]
    Empty,
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("write to update slot failed: {0}")]
    Sink(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub size: usize,
    pub digest: Sha256Digest,
}

pub struct ImageWriter<S> {
    sink: S,
    hasher: Sha256,
    progress: ProgressTracker,
    max_size: usize,
}

/// Reject an announced `Content-Length` before any slot is opened
pub fn check_announced_size(expected_len: Option<usize>, max_size: usize) -> Result<(), ImageError> {
    match expected_len {
        Some(size) if size > max_size => Err(ImageError::TooLarge { size, max: max_size }),
        _ => Ok(()),
    }
}

impl<S: FirmwareSink> ImageWriter<S> {
    /// `expected_len` is the announced `Content-Length`, if any
    pub fn new(sink: S, expected_len: Option<usize>, max_size: usize) -> Self {
        Self {
            sink,
            hasher: Sha256::new(),
            progress: ProgressTracker::new(expected_len),
            max_size,
        }
    }

    /// Forward one chunk. Returns true when progress crossed a reporting step.
    pub fn write(&mut self, chunk: &[u8]) -> Result<bool, ImageError> {
        if chunk.is_empty() {
            return Ok(false);
        }

        let size = self.progress.written() + chunk.len();
        if size > self.max_size {
            return Err(ImageError::TooLarge { size, max: self.max_size });
        }
        if let Some(expected) = self.progress.total() {
            if size > expected {
                return Err(ImageError::Overrun { expected });
            }
        }

        self.sink
            .write_chunk(chunk)
            .map_err(|e| ImageError::Sink(e.to_string()))?;
        self.hasher.update(chunk);

        Ok(self.progress.advance(chunk.len()))
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Give the sink back, to complete or abort the update slot
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Check length and digest of everything written so far
    pub fn verify(&self, expected: Option<&Sha256Digest>) -> Result<ImageSummary, ImageError> {
        let got = self.progress.written();
        if got == 0 {
            return Err(ImageError::Empty);
        }
        if let Some(expected) = self.progress.total() {
            if got != expected {
                return Err(ImageError::Truncated { expected, got });
            }
        }

        let digest = Sha256Digest::from_hasher(self.hasher.clone());
        if let Some(expected) = expected {
            if *expected != digest {
                return Err(ImageError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: digest.to_string(),
                });
            }
        }

        Ok(ImageSummary { size: got, digest })
    }
}
