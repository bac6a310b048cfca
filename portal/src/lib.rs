//! Patient-facing screening flows.
//!
//! The browser client of the screening product, expressed as a library: an
//! in-memory session store standing in for web storage, the mocked
//! authentication, the intake form submission, per-slot image gating, and
//! the detection/monitoring state machines that drive the backend over
//! HTTP. A UI shell (native or web) would own one of these structs per page
//! and render its getters.

pub mod api;
pub mod flows;
pub mod intake;
pub mod report;
pub mod session;
pub mod upload;
