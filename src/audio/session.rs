//! Capture session management for one-shot voice recording.
//!
//! Bridges a push-based capture stream into a single contiguous sample
//! buffer: start opens the stream and accumulates chunks in arrival
//! order, stop closes the stream and hands back the finished buffer.

use crate::audio::source::{CaptureSource, ChunkHandler, Sample, StreamHandle};
use crate::error::CaptureError;
use std::sync::{Arc, Mutex, PoisonError};

/// Lifecycle state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

/// Callback invoked with the finished buffer when a recording stops.
pub type FinishHandler = Box<dyn FnMut(&[Sample]) + Send>;

/// Owns the lifecycle of one recording at a time.
///
/// At most one stream is open per session instance. The accumulation
/// buffer is allocated fresh on every `start`, appended to only by the
/// stream's chunk handler while recording, and read exactly once by the
/// `stop` snapshot. The stream is closed before the snapshot is taken,
/// so writer and reader never overlap.
pub struct CaptureSession<S: CaptureSource> {
    source: S,
    stream: Option<StreamHandle>,
    buffer: Arc<Mutex<Vec<Sample>>>,
    on_finish: Option<FinishHandler>,
}

impl<S: CaptureSource> CaptureSession<S> {
    /// Create a new idle session around a capture source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            on_finish: None,
        }
    }

    /// Register a handler invoked with the snapshot on every `stop`.
    ///
    /// The handler runs after the stream has been released, so a
    /// panicking consumer cannot leak the recording resource.
    pub fn with_finish_handler(mut self, on_finish: impl FnMut(&[Sample]) + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(on_finish));
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.stream.is_some() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.state() == SessionState::Recording
    }

    /// Number of samples accumulated so far in the active recording.
    pub fn buffered_samples(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Start a new recording.
    ///
    /// Allocates a fresh accumulation buffer, opens the capture stream,
    /// and subscribes the chunk handler. Chunks are appended in arrival
    /// order; empty chunks are ignored.
    ///
    /// # Errors
    /// - `AlreadyRecording` if a recording is active; the existing
    ///   buffer and stream are untouched.
    /// - `PermissionDenied` / `DeviceUnavailable` from stream
    ///   acquisition; the session stays idle with no partial state.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        // Fresh allocation, not clear(): the previous snapshot was moved
        // out by stop() and must never be touched again.
        self.buffer = Arc::new(Mutex::new(Vec::new()));

        let buffer = Arc::clone(&self.buffer);
        let handler: ChunkHandler = Box::new(move |chunk: &[Sample]| {
            if chunk.is_empty() {
                return;
            }
            buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(chunk);
        });

        let stream = self.source.open(handler)?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop the active recording and return the finished buffer.
    ///
    /// Closes the stream first (the handle also closes on drop, so the
    /// OS recording resource is released exactly once on every path),
    /// snapshots the buffer, returns to idle, and invokes the finish
    /// handler with the snapshot. A no-op returning an empty buffer
    /// when already idle; never fails.
    pub fn stop(&mut self) -> Vec<Sample> {
        let Some(mut stream) = self.stream.take() else {
            return Vec::new();
        };
        stream.close();
        drop(stream);

        let snapshot = std::mem::take(
            &mut *self
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        if let Some(on_finish) = self.on_finish.as_mut() {
            on_finish(&snapshot);
        }

        snapshot
    }

    /// Consume the session, returning its capture source.
    ///
    /// An active stream is closed first.
    pub fn into_source(mut self) -> S {
        self.stop();
        self.source
    }
}
