//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use tracing::{debug, debug_span};

use crate::label::Label;

// MPLS LIB debug narration, logged through `tracing` at debug level.
// One variant per state transition worth narrating; mirrors the split
// between `Debug` (always-on trace of what happened) and `Error`
// (conditions worth a warning or error) used throughout this crate's
// teacher lineage.
#[derive(Debug)]
pub enum Debug<'a> {
    BindingsCreate(&'a Ipv4Network),
    StaticInLabelSet(&'a Ipv4Network, Label),
    StaticInLabelCleared(&'a Ipv4Network),
    DynamicInLabelSet(&'a Ipv4Network, Label),
    DynamicInLabelCleared(&'a Ipv4Network),
    SelectedInLabelChanged(&'a Ipv4Network, Option<Label>, Option<Label>),
    StaticLspAdded(&'a Ipv4Network, &'a Ipv4Addr, Label),
    StaticLspRemoved(&'a Ipv4Network, &'a Ipv4Addr),
    DynamicLspSet(&'a Ipv4Network, &'a Ipv4Addr, Label),
    DynamicLspCleared(&'a Ipv4Network, &'a Ipv4Addr),
    LspSelected(&'a Ipv4Network, &'a Ipv4Addr, Label),
    LspUnselected(&'a Ipv4Network),
    NoActiveNexthop(&'a Ipv4Network),
    RouteInstalled(&'a Ipv4Network),
    RouteUninstalled(&'a Ipv4Network),
    CrossConnectInstalled(Label, &'a Ipv4Addr),
    CrossConnectReplaced(Label, &'a Ipv4Addr),
    CrossConnectRemoved(Label),
}

impl<'a> Debug<'a> {
    pub fn log(&self) {
        match self {
            Debug::BindingsCreate(prefix) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!("{}", self);
                });
            }
            Debug::StaticInLabelSet(prefix, label)
            | Debug::DynamicInLabelSet(prefix, label) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!(%label, "{}", self);
                });
            }
            Debug::StaticInLabelCleared(prefix)
            | Debug::DynamicInLabelCleared(prefix) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!("{}", self);
                });
            }
            Debug::SelectedInLabelChanged(prefix, old, new) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!(?old, ?new, "{}", self);
                });
            }
            Debug::StaticLspAdded(prefix, nexthop, label)
            | Debug::DynamicLspSet(prefix, nexthop, label) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!(%nexthop, %label, "{}", self);
                });
            }
            Debug::StaticLspRemoved(prefix, nexthop)
            | Debug::DynamicLspCleared(prefix, nexthop) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!(%nexthop, "{}", self);
                });
            }
            Debug::LspSelected(prefix, nexthop, label) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!(%nexthop, %label, "{}", self);
                });
            }
            Debug::LspUnselected(prefix)
            | Debug::NoActiveNexthop(prefix)
            | Debug::RouteInstalled(prefix)
            | Debug::RouteUninstalled(prefix) => {
                debug_span!("mpls-lib", %prefix).in_scope(|| {
                    debug!("{}", self);
                });
            }
            Debug::CrossConnectInstalled(label, nexthop)
            | Debug::CrossConnectReplaced(label, nexthop) => {
                debug!(%label, %nexthop, "{}", self);
            }
            Debug::CrossConnectRemoved(label) => {
                debug!(%label, "{}", self);
            }
        }
    }
}

impl<'a> std::fmt::Display for Debug<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::BindingsCreate(..) => write!(f, "bindings record created"),
            Debug::StaticInLabelSet(..) => write!(f, "static input label set"),
            Debug::StaticInLabelCleared(..) => {
                write!(f, "static input label cleared")
            }
            Debug::DynamicInLabelSet(..) => write!(f, "dynamic input label set"),
            Debug::DynamicInLabelCleared(..) => {
                write!(f, "dynamic input label cleared")
            }
            Debug::SelectedInLabelChanged(..) => {
                write!(f, "selected input label changed")
            }
            Debug::StaticLspAdded(..) => write!(f, "static LSP added"),
            Debug::StaticLspRemoved(..) => write!(f, "static LSP removed"),
            Debug::DynamicLspSet(..) => write!(f, "dynamic LSP set"),
            Debug::DynamicLspCleared(..) => write!(f, "dynamic LSP cleared"),
            Debug::LspSelected(..) => write!(f, "LSP selected"),
            Debug::LspUnselected(..) => write!(f, "LSP unselected"),
            Debug::NoActiveNexthop(..) => {
                write!(f, "could not determine the next hop of the active route")
            }
            Debug::RouteInstalled(..) => write!(f, "route installed"),
            Debug::RouteUninstalled(..) => write!(f, "route uninstalled"),
            Debug::CrossConnectInstalled(..) => {
                write!(f, "static cross-connect installed")
            }
            Debug::CrossConnectReplaced(..) => {
                write!(f, "static cross-connect replaced")
            }
            Debug::CrossConnectRemoved(..) => {
                write!(f, "static cross-connect removed")
            }
        }
    }
}
