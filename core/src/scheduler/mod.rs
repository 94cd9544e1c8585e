//! Cooperative scheduling: the host stream, shared task state, and the
//! chunked software decrypter.

pub mod stream;
pub mod task;
pub mod chunked;

pub use stream::{AsyncStream, Deferred, Job, StreamHandle};
pub use task::{DecryptHandle, DecryptRequest};
pub use chunked::Decrypter;
