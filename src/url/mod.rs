//! URL handling module for Robly
//!
//! This module turns the heterogeneous link strings found in pages into
//! absolute, crawlable URLs: protocol detection, public-suffix-aware base
//! domain decomposition, and link resolution.

mod domain;
mod resolve;

pub use domain::{base_domain_of, decompose, DomainParts};
pub use resolve::{protocol_of, resolve};
