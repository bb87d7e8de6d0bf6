//! Incremental server-sent-events decoding

mod accumulator;
mod decoder;

pub use decoder::StreamDecoder;
