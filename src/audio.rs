//! Audio capture: the session state machine, the capture source seam,
//! the cpal microphone backend, and WAV packaging for service payloads.

#[cfg(feature = "mic")]
pub mod mic;
pub mod session;
pub mod source;
pub mod wav;
