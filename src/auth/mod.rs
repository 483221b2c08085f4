//! Credential and scope handling.
//!
//! A credential is an opaque bearer token; an external verifier answers
//! validity plus the granted scope set. This module owns the scope model
//! (exact-match `category:action:resource` strings) and the verifier seam.

pub mod scope;
pub mod verifier;

pub use scope::{Scope, ScopeSet};
pub use verifier::{authenticate, Claims, CredentialVerifier, HttpVerifier};
