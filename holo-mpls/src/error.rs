//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::Ipv4Network;
use tracing::{error, warn, warn_span};

use crate::driver::DriverError;
use crate::label::Label;

// MPLS LIB errors. Per spec.md §7, none of these abort the calling
// mutator: they are either logged and the in-memory state left
// consistent with a partial install (driver failures), or they are
// surfaced to the caller as an explicit result (cross-connect
// add/remove, the only operations with a fallible public contract).
#[derive(Debug)]
pub enum Error {
    // A driver call failed while installing or removing forwarding
    // state for `prefix`. Logged and otherwise left for the next
    // triggering event to retry (spec.md §5, §7).
    DriverCallFailed(Ipv4Network, DriverError),
    // A cross-connect add failed partway through its install sequence
    // and was unwound.
    CrossConnectInstallFailed(Label, DriverError),
    // A cross-connect with the requested incoming label does not
    // exist.
    CrossConnectNotFound(Label),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::DriverCallFailed(prefix, source) => {
                warn_span!("prefix", %prefix).in_scope(|| {
                    warn!(error = %source, "{}", self);
                });
            }
            Error::CrossConnectInstallFailed(label, source) => {
                error!(%label, error = %source, "{}", self);
            }
            Error::CrossConnectNotFound(label) => {
                warn!(%label, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DriverCallFailed(..) => {
                write!(f, "forwarding-plane driver call failed")
            }
            Error::CrossConnectInstallFailed(..) => {
                write!(f, "failed to install static cross-connect")
            }
            Error::CrossConnectNotFound(..) => {
                write!(f, "static cross-connect not found")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DriverCallFailed(_, source) => Some(source),
            Error::CrossConnectInstallFailed(_, source) => Some(source),
            Error::CrossConnectNotFound(_) => None,
        }
    }
}

// Outcome of a mutator call (spec.md §6 "Exit codes of mutators").
// Mutators never abort the process on bad input; a `Warning` means the
// call was a no-op (malformed input or nothing to do), never a
// partially-applied change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutatorOutcome {
    Applied,
    Warning(MutatorWarning),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutatorWarning {
    // The requested change is already in effect (idempotent no-op).
    NoChange,
    // A label-match clear request didn't match the stored label.
    LabelMismatch,
    // A dynamic-LSP clear request didn't match the stored (nexthop,
    // label) pair.
    LspMismatch,
}

impl MutatorOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, MutatorOutcome::Applied)
    }
}
