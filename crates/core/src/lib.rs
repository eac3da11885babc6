//! Mercado Core - Shared domain library for the storefront.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no session storage. The storefront crate owns every side effect
//! and drives these types from its handlers.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices
//! - [`catalog`] - Products and category filtering
//! - [`cart`] - Cart entries, totals and checkout orders
//! - [`i18n`] - Translation trees and language resolution
//! - [`registration`] - The three-step registration wizard

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod i18n;
pub mod registration;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CheckoutLine, CheckoutOrder, LineId};
pub use catalog::{CategoryFilter, Product};
pub use i18n::{Language, TranslationCatalog, TranslationNode, Translator};
pub use registration::{
    Registration, RegistrationError, RegistrationStep, RegistrationWizard, StepInput, StepOutcome,
};
pub use types::*;
