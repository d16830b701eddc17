//! CLI commands implementation

pub mod ingest;
pub mod init;
pub mod records;
pub mod status;

pub use ingest::*;
pub use init::*;
pub use records::*;
pub use status::*;
