pub mod cancel;
pub mod walk;

pub use cancel::CancelToken;
pub use walk::{PathWalker, WalkItem, WalkStream};
