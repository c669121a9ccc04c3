//! Typed inputs for the order endpoints: request bodies and query strings.
//!
//! Inputs are checked by type here. Business validation (non-empty items,
//! positive quantities, a well-formed restaurant id) happens in `domain`.

pub(crate) mod order;
