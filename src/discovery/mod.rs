//! Discovery: decides which listed models to probe and probes them.
//!
//! - `exclude`: substring denylist applied to the listing
//! - `scanner`: bounded worker pool driving `PlatformAdapter::probe`

pub mod exclude;
pub mod scanner;

pub use exclude::{filter_models, should_skip, DEFAULT_EXCLUDES};
pub use scanner::{ScanError, Scanner};
