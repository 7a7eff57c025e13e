//! Reference-list detection and the missing-citation check.
//!
//! The flow is: locate the sources heading ([`section`]), split the document
//! around it ([`document`]), turn each list paragraph into a record
//! ([`entry`]), then search the body for citations ([`pipeline`]).

pub mod config;
pub mod document;
pub mod entry;
pub mod pipeline;
pub mod section;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use document::Document;
pub use entry::{EntryFields, MalformedEntry, SourceBuilder};
pub use pipeline::{find_missing_sources, find_missing_sources_in};
pub use section::{HeadingDetector, find_heading_exact, is_sources_heading};
