//! Session orchestration.

pub mod session;

pub use session::{ChatSession, SessionHandle, SessionOptions};
