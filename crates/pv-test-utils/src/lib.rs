//! Test utilities for user-pool token validation.
//!
//! Provides RSA keypair fixtures, a fluent token builder, and JWKS
//! endpoint mocking helpers for integration tests.

/// Module for RSA keypairs, token builders, and JWKS fixtures
pub mod token_builders;

pub use token_builders::{jwks_document, mount_jwks, RsaKeypair, TokenBuilder};
