pub mod accumulate;
pub mod summary;

pub use accumulate::{accumulate_provider_metadata, add_usage};
pub use summary::{get_total_cost, sum_usage_history};
