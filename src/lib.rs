pub mod config;
pub mod data;
pub mod enrich;
pub mod event;
pub mod filter;
pub mod format;
pub mod notify;
pub mod pipeline;
pub mod sink;
pub mod source;

#[cfg(test)]
mod testing;
