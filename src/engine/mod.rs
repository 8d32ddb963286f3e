pub mod fallback;
pub mod pipeline;
pub mod walker;

pub use fallback::FallbackDriver;
pub use pipeline::CrawlEngine;
pub use walker::{ChapterWalker, WalkOptions, WalkOutcome};
