//! stackpush cloud abstraction
//!
//! This crate defines the seam between the deployment orchestrator and the
//! provisioning service it drives. Provider errors that the orchestrator
//! branches on are normalized into typed outcomes here, so callers never
//! sniff provider error text.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 stackpush-core                   │
//! │   (config layering, binding, deploy, polling)    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                stackpush-cloud                   │
//! │  ┌──────────────────────┐ ┌───────────────────┐ │
//! │  │ trait StackProvider  │ │ trait VariableBroker│
//! │  └──────────────────────┘ └───────────────────┘ │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │  stackpush-   │
//!           │  cloud-aws    │
//!           └───────────────┘
//! ```

pub mod broker;
pub mod error;
pub mod provider;
pub mod stack;

// Re-exports
pub use broker::VariableBroker;
pub use error::{CloudError, Result};
pub use provider::StackProvider;
pub use stack::{
    Capability, CreateOutcome, Parameter, StackRequest, StackResource, StackStatus,
    StackStatusReport, Tag, UpdateOutcome,
};
