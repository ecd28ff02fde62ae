pub mod index;
#[allow(clippy::module_inception)]
pub mod timeline;

pub use index::TimeIndex;
pub use timeline::EventTimeline;
