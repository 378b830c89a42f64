pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, ChatWidget};
pub use client::ChatClient;
pub use config::Config;
pub use error::ChatError;
pub use state::{Conversation, Message, Role};
