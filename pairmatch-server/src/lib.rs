pub mod config;
pub mod connection_registry;
pub mod observability;
pub mod route;
pub mod state;
pub mod websocket_listener;

pub use config::ServerConfig;
pub use connection_registry::ConnectionRegistry;
pub use observability::LogConfig;
pub use route::create_router;
pub use state::AppState;
