//! LightChain - a minimal append-only hash-linked ledger
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, validation and the shared writer handle
//! - [`hashing`] - Canonical SHA-256 block digest
//!
//! ## Capabilities
//! - [`crypto`] - Signing service (secp256k1 ECDSA, ed25519)
//! - [`rng`] - Randomness service for block nonces
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod hashing;

// ============================================================================
// Capabilities
// ============================================================================
pub mod crypto;
pub mod rng;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{Block, Ledger, SharedLedger, Transaction};
pub use error::{ChainError, Result};
