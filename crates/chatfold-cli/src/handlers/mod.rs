mod context;

pub mod config;
pub mod price;
pub mod replay;
pub mod sanitize;
pub mod stats;
pub mod usage;

pub use context::HandlerContext;
