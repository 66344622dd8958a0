//! Recognition service: the collaborator that turns finished inputs
//! (image files, capture buffers, raw text) into recognized content.

pub mod client;
pub mod service;
