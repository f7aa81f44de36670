pub mod ai;
pub mod assets;
pub mod config;
pub mod conversation;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use ai::{OpenRouterClient, ProxyClient};
pub use config::Config;
pub use conversation::Conversation;
pub use state::{ChatMessage, ChatRole, TurnState, WidgetState};
pub use transport::{CompletionTransport, Transport};
