//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Reconciliation engine for an MPLS Label Information Base: tracks,
//! per IP prefix, which incoming label is bound to it and which
//! outgoing label/next-hop pair packets should be forwarded with, and
//! keeps a pluggable forwarding-plane driver synchronized with that
//! state as the IP routing table and a dynamic label-distribution
//! protocol both push updates into it.
//!
//! This crate owns none of the collaborators it needs to do that: the
//! IP routing table ([`rib::Rib`]), the forwarding-plane programmer
//! ([`driver::Driver`]) and the notification bus toward the dynamic
//! label-distribution protocol ([`broadcast::ClientBroadcast`]) are
//! all traits an embedding daemon implements and passes in on every
//! call. [`engine::Engine`] is the crate's single entry point.

pub mod bindings;
pub mod broadcast;
pub mod crossconnect;
pub mod debug;
pub mod driver;
pub mod engine;
pub mod error;
pub mod label;
pub mod rib;
pub mod views;

#[cfg(feature = "testing")]
pub mod testing;

pub use bindings::{LabelBindings, Lsp, SelectedLsp};
pub use broadcast::ClientBroadcast;
pub use crossconnect::{CrossConnect, CrossConnects};
pub use driver::{Driver, DriverError, DriverResult, NhlfeHandle, NullDriver};
pub use engine::Engine;
pub use error::{Error, MutatorOutcome, MutatorWarning};
pub use label::Label;
pub use rib::Rib;
pub use views::{BindingEntry, ForwardingEntry, OutTreatment, StaticBindingEntry};
