//! # Tidewire Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs            # Wired node with recording remote nodes
//!     ├── subscription_flow.rs  # subscribe / unsubscribe and notifications
//!     ├── publish_flow.rs       # ingest, geometry matching, inline uploads
//!     ├── ack_flow.rs           # signed acknowledgements
//!     └── link_flow.rs          # upload-as-link and getByLink
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tw-tests
//! cargo test -p tw-tests integration::publish_flow
//! ```

pub mod integration;
