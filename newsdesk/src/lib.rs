// Library interface for newsdesk modules
// This allows tests and the binary to import modules

pub mod llm;
pub mod news;
pub mod pipeline;
pub mod server;
