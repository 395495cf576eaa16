//! HTTP API handlers for the identification service
//!
//! REST + SSE surface; the presentation layer talks only to these routes and
//! the orchestrator behind them.

pub mod health;
pub mod identify;
pub mod plants;
pub mod sse;

pub use health::health_routes;
pub use identify::identify_routes;
pub use plants::plant_routes;
pub use sse::event_stream;
