//! Finding output: the streaming sink and post-scan exports

pub mod jsonl;
pub mod sink;
