// Job posting ingestion: fetch, content extraction, metadata resolution, intake.
// The extraction core is synchronous and performs no I/O; only the fetcher does.

pub mod description;
pub mod extractor;
pub mod fetcher;
pub mod handlers;
pub mod intake;
pub mod metadata;
