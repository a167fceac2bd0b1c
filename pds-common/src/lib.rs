// pds-common - Wire-level primitives shared by the PDS command layer
//
// This crate defines command tokens, RESP request framing and the reply
// reader capability the command layer decodes replies through.

pub mod arg;
pub mod error;
pub mod reader;
pub mod resp;

// Re-export for convenience
pub use arg::*;
pub use error::*;
pub use reader::*;
pub use resp::*;
