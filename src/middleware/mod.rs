// Request middleware

pub mod signature;

pub use signature::{verify_queue_signature, SignatureError, SignatureVerifier};
