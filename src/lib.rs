//! Opsdeck - An operator console for multi-account cloud infrastructure.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Initialize opsdeck
//! │   ├── status        # Configuration and deployment overview
//! │   ├── accounts      # Account listing and session reconnect
//! │   ├── inventory     # Resource inventory views
//! │   ├── deploy        # Deployment listing, approval, trigger
//! │   ├── console       # Interactive panel loop
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # .opsdeck.toml management
//!     ├── account       # Account and region types
//!     ├── credentials   # Credential store abstraction
//!     ├── session       # Per-(account, region) session cache
//!     ├── cache         # TTL result cache
//!     ├── context       # Per-session context owning both caches
//!     ├── cloud/        # Control-plane client seam
//!     │   ├── mod       # CloudApi and ClientFactory traits
//!     │   └── demo      # Deterministic fallback inventory
//!     └── deploy/       # Deployment registry
//!         ├── record    # Deployment record and approval state machine
//!         ├── provider  # Pipeline provider seam with fixed fallback
//!         └── registry  # Source of truth, ordering, persistence
//! ```
//!
//! # Features
//!
//! - Cached, re-usable authenticated sessions per account/region pair
//! - TTL-bounded memoization of expensive inventory reads
//! - Auditable approval state machine gating production deployments
//! - Fallback data sources clearly flagged as illustrative
//! - Extensible credential, cloud, and pipeline provider backends

pub mod cli;
pub mod core;
pub mod error;
