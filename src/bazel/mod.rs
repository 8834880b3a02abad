//! Everything that talks to the `bazel` subprocess: the file-query half of
//! pattern classification, the build driver, the event-stream consumer,
//! and the scoped temp file the latter two share.

pub mod driver;
pub mod event_stream;
pub mod query;
pub mod tempfile_guard;

pub use driver::build_aspects;
pub use event_stream::extract_output_files;
