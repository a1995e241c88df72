mod event_source;
mod summary_store;

pub use event_source::EventSource;
pub use summary_store::{SummaryStore, SummaryUpdate};
