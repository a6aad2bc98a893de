// Adapters layer: concrete implementations for external systems (manifest storage, sessions, rendering, http).

pub mod http;
pub mod render;
pub mod session;
pub mod storage;
