pub mod apply;
pub mod chat;
pub mod codeblock;
pub mod commands;
pub mod fs;
pub mod graph;
pub mod knowledge;
pub mod logging;
pub mod prompts;
pub mod utils;
