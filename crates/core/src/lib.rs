//! Core library for translating SRT subtitle files through a remote
//! language model, with batching, retries and progress checkpointing.

pub mod backup;
pub mod srt;
pub mod translate;
