//! SSE HTTP transport for order streams.
//!
//! The fan-out itself (Manager, SubscriptionRegistry, framing) lives in the
//! `sse` crate; this module only turns an order stream into an HTTP response.

pub mod handler;
