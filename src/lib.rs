pub mod agent;
pub mod config;
pub mod model;
pub mod reply;
pub mod secret;
pub mod theme;

// Re-export the relay surface at crate root for convenience
pub use agent::{AgentExit, RelayOptions, run};
pub use config::AgentConfig;
pub use model::{GeminiClient, GenerativeModel};
