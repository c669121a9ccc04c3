//! Server-Sent Events (SSE) infrastructure for live order notifications.
//!
//! This crate delivers newly committed orders, in real time, to every
//! restaurant-side viewer holding an open order stream.
//!
//! # Architecture
//!
//! - **One subscription per open stream**: each stream owns a bounded delivery
//!   channel and a registry entry tagged with the restaurant it watches.
//! - **Dual-index registry**: O(1) lookups for both subscription management and
//!   restaurant-scoped routing via separate DashMap indices.
//! - **Non-blocking fan-out**: publishing uses `try_send`; a slow viewer loses
//!   events instead of delaying anyone else.
//! - **Ephemeral messages**: events are a live notification layered over the
//!   durable order store. A viewer that is offline or too slow misses them and
//!   sees fresh data on the next listing.
//! - **Context-driven teardown**: a stream ends when its governing
//!   `CancellationToken` is cancelled or when it is dropped; cleanup always
//!   unregisters before closing the channel.
//!
//! # Message Flow
//!
//! 1. A viewer opens `GET /restaurants/{id}/orders` with `Accept: text/event-stream`
//! 2. The web layer calls [`Manager::open`], registering a subscription
//! 3. An order is committed; the domain layer spawns a detached publish of
//!    `DomainEvent::OrderCreated`
//! 4. [`domain_event_handler::SseDomainEventHandler`] calls [`Manager::publish`],
//!    which looks up the restaurant's subscriptions and pushes the event
//! 5. Each stream yields the event and the web layer writes one SSE frame
//!
//! # Modules
//!
//! - `connection`: SubscriptionRegistry with dual-index architecture and type-safe SubscriptionId
//! - `subscription`: per-stream lifecycle (receive, cancel, cleanup)
//! - `manager`: publish and open, the entry points used by the rest of the workspace
//! - `message`: SSE framing of events
//! - `domain_event_handler`: bridge from the domain event publisher

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;
pub mod subscription;

pub use manager::Manager;
pub use subscription::Subscription;
