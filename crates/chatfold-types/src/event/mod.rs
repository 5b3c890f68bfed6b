pub mod event;
pub mod payload;
pub mod stream;

pub use event::*;
pub use payload::*;
pub use stream::*;
