use crate::error::CaptureError;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// One raw audio sample as delivered by a capture backend (16-bit PCM).
pub type Sample = i16;

/// Callback invoked by a capture stream for every delivered chunk.
///
/// Runs on the backend's delivery thread, not the caller's. Must be
/// cheap: backends deliver rapidly and nothing downstream throttles.
pub type ChunkHandler = Box<dyn FnMut(&[Sample]) + Send + 'static>;

/// Trait for media capture sources.
///
/// This trait allows swapping implementations (real microphone vs mock).
/// `open` acquires the underlying input stream and subscribes the given
/// chunk handler; the returned [`StreamHandle`] is the only way to stop
/// delivery.
pub trait CaptureSource: Send {
    /// Open the capture stream and subscribe a chunk handler.
    ///
    /// On success the source emits a live, non-restartable sequence of
    /// chunks into `on_chunk` until the handle is closed. On failure no
    /// stream is left open and no handler is retained.
    fn open(&mut self, on_chunk: ChunkHandler) -> Result<StreamHandle, CaptureError>;
}

/// Handle to an open capture stream.
///
/// Closing unsubscribes the chunk handler and releases the OS recording
/// resource. `close` is idempotent, and dropping an open handle closes
/// it, so the stream is released on every exit path.
pub struct StreamHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl StreamHandle {
    /// Wrap a release action. The action runs at most once.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Close the stream. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the stream is still open.
    pub fn is_open(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Failure the mock injects on `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockFailure {
    PermissionDenied,
    DeviceUnavailable,
}

type SharedHandler = Arc<Mutex<Option<ChunkHandler>>>;

/// Mock capture source for testing.
///
/// Clones share the same handler slot, so a test can keep one clone to
/// drive `emit` while a session owns the other.
#[derive(Clone)]
pub struct MockCaptureSource {
    handler: SharedHandler,
    failure: Option<MockFailure>,
    error_message: String,
}

impl MockCaptureSource {
    /// Create a new mock capture source that opens successfully.
    pub fn new() -> Self {
        Self {
            handler: Arc::new(Mutex::new(None)),
            failure: None,
            error_message: "mock capture error".to_string(),
        }
    }

    /// Configure the mock to fail `open` with `PermissionDenied`.
    pub fn with_permission_denied(mut self) -> Self {
        self.failure = Some(MockFailure::PermissionDenied);
        self
    }

    /// Configure the mock to fail `open` with `DeviceUnavailable`.
    pub fn with_device_unavailable(mut self) -> Self {
        self.failure = Some(MockFailure::DeviceUnavailable);
        self
    }

    /// Configure the error message used for injected failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Deliver a chunk to the subscribed handler.
    ///
    /// Returns true if a handler was subscribed (stream open); emission
    /// after close is discarded and returns false.
    pub fn emit(&self, chunk: &[Sample]) -> bool {
        let mut slot = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(handler) => {
                handler(chunk);
                true
            }
            None => false,
        }
    }

    /// Whether a stream is currently open on this mock.
    pub fn is_open(&self) -> bool {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for MockCaptureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for MockCaptureSource {
    fn open(&mut self, on_chunk: ChunkHandler) -> Result<StreamHandle, CaptureError> {
        match self.failure {
            Some(MockFailure::PermissionDenied) => {
                return Err(CaptureError::PermissionDenied {
                    message: self.error_message.clone(),
                });
            }
            Some(MockFailure::DeviceUnavailable) => {
                return Err(CaptureError::DeviceUnavailable {
                    device: self.error_message.clone(),
                });
            }
            None => {}
        }

        *self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(on_chunk);

        let slot = Arc::clone(&self.handler);
        Ok(StreamHandle::new(move || {
            slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_delivers_chunks_to_subscribed_handler() {
        let mut source = MockCaptureSource::new();
        let received: Arc<Mutex<Vec<Sample>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        let _handle = source
            .open(Box::new(move |chunk| {
                sink.lock().unwrap().extend_from_slice(chunk);
            }))
            .unwrap();

        assert!(source.emit(&[1, 2, 3]));
        assert!(source.emit(&[4]));
        assert_eq!(*received.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn emission_after_close_is_discarded() {
        let mut source = MockCaptureSource::new();
        let received: Arc<Mutex<Vec<Sample>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        let mut handle = source
            .open(Box::new(move |chunk| {
                sink.lock().unwrap().extend_from_slice(chunk);
            }))
            .unwrap();

        assert!(source.emit(&[1]));
        handle.close();
        assert!(!source.emit(&[2]));
        assert_eq!(*received.lock().unwrap(), vec![1]);
    }

    #[test]
    fn close_is_idempotent() {
        let mut source = MockCaptureSource::new();
        let mut handle = source.open(Box::new(|_| {})).unwrap();

        assert!(handle.is_open());
        handle.close();
        assert!(!handle.is_open());
        handle.close();
        assert!(!handle.is_open());
    }

    #[test]
    fn dropping_handle_closes_stream() {
        let mut source = MockCaptureSource::new();
        let handle = source.open(Box::new(|_| {})).unwrap();

        assert!(source.is_open());
        drop(handle);
        assert!(!source.is_open());
    }

    #[test]
    fn open_failure_permission_denied() {
        let mut source = MockCaptureSource::new()
            .with_permission_denied()
            .with_error_message("user dismissed the prompt");

        match source.open(Box::new(|_| {})) {
            Err(CaptureError::PermissionDenied { message }) => {
                assert_eq!(message, "user dismissed the prompt");
            }
            other => panic!("Expected PermissionDenied, got {:?}", other.map(|_| ())),
        }
        assert!(!source.is_open());
    }

    #[test]
    fn open_failure_device_unavailable() {
        let mut source = MockCaptureSource::new().with_device_unavailable();

        match source.open(Box::new(|_| {})) {
            Err(CaptureError::DeviceUnavailable { .. }) => {}
            other => panic!("Expected DeviceUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn clones_share_the_handler_slot() {
        let mut source = MockCaptureSource::new();
        let driver = source.clone();

        let received: Arc<Mutex<Vec<Sample>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let _handle = source
            .open(Box::new(move |chunk| {
                sink.lock().unwrap().extend_from_slice(chunk);
            }))
            .unwrap();

        assert!(driver.emit(&[7, 8]));
        assert_eq!(*received.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn reopening_replaces_the_handler() {
        let mut source = MockCaptureSource::new();

        let first: Arc<Mutex<Vec<Sample>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&first);
        let mut handle = source
            .open(Box::new(move |chunk| {
                sink.lock().unwrap().extend_from_slice(chunk);
            }))
            .unwrap();
        source.emit(&[1]);
        handle.close();

        let second: Arc<Mutex<Vec<Sample>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&second);
        let _handle = source
            .open(Box::new(move |chunk| {
                sink.lock().unwrap().extend_from_slice(chunk);
            }))
            .unwrap();
        source.emit(&[2]);

        assert_eq!(*first.lock().unwrap(), vec![1]);
        assert_eq!(*second.lock().unwrap(), vec![2]);
    }

    #[test]
    fn capture_source_is_object_safe() {
        let mut source: Box<dyn CaptureSource> = Box::new(MockCaptureSource::new());
        let handle = source.open(Box::new(|_| {}));
        assert!(handle.is_ok());
    }
}
