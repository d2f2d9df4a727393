pub mod session;

pub use session::{SessionError, WardrobeSession};
