//! Integration tests for graphvfs-vfs
//!
//! Runs the filesystem adapter against a wiremock Graph server, covering
//! the path/id resolution of every operation, not-found translation and
//! delta-driven watches.


mod test_filesystem;
mod test_watch;
