//! Session-held models for storefront.

pub mod session;
