//! Image ingestion: resolving sources to bytes and decoding them in parallel.

pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod source;
