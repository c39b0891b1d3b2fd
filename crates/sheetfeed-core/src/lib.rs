pub mod dataset;
pub mod flatten;
mod pipeline;
pub mod publish;

pub use flatten::{flatten_records, Table};
pub use pipeline::run_dataset;
pub use publish::{publish, Destination, PublishOutcome};
