//! Stoker - data entry and reporting engine for plant operational metrics
//!
//! Declarative form schemas drive every data-entry module in the plant's
//! reporting stack: unit performance, coal analysis, water chemistry, DM
//! plant sections, the fuel ledger. This crate is the generic engine those
//! pages share; the REST backend owns persistence, authentication, and
//! aggregation.
//!
//! ## Components
//!
//! - **Schema**: declarative field/panel definitions plus an immutable
//!   registry seeded at startup
//! - **Form**: the editable state behind one form and the submission
//!   pipeline that validates and posts it
//! - **Loader**: existence lookups with stale-response protection
//! - **Report**: aggregate statistics viewer tolerant of both backend key
//!   encodings
//! - **Page**: composition layer wiring one module's pieces together under
//!   an explicit capability context

pub mod client;
pub mod config;
pub mod form;
pub mod loader;
pub mod page;
pub mod report;
pub mod schema;
pub mod types;

pub use config::Args;
pub use types::{EngineError, Result};
