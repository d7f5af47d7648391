// WebSocket module
//
// - handler: upgrade-time authentication (entry point)
// - connection: per-socket task pair (single writer, receive loop)
// - routes: HTTP route setup (/ws, /health, root banner)

mod connection;
mod handler;
mod routes;

pub use handler::websocket_handler;
pub use routes::create_router;
