//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::engine::Engine;
use crate::label::Label;
use crate::rib::Rib;

// What a forwarding-plane entry does with the packets it receives on
// its incoming label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutTreatment {
    Push(Label),
    Pop,
}

// One row of the forwarding view (spec.md §4.6): a prefix with an
// active route and a programmed incoming label.
#[derive(Clone, Debug)]
pub struct ForwardingEntry {
    pub prefix: Ipv4Network,
    pub in_label: Label,
    pub out: OutTreatment,
    pub nexthop: Ipv4Addr,
    pub out_iface: Option<String>,
}

// One row of the per-prefix label-binding view (the LIB proper):
// whatever incoming and outgoing bindings exist for a prefix,
// regardless of whether a route is currently active.
#[derive(Clone, Debug)]
pub struct BindingEntry {
    pub prefix: Ipv4Network,
    pub in_label: Option<Label>,
    pub out_label: Option<Label>,
    pub lsr_id: Option<Ipv4Addr>,
}

// One row of the static-only view (spec.md §4.6): the configured
// static bindings for a prefix, independent of whether they are
// currently selected or installed. Used by the configuration dumper.
#[derive(Clone, Debug)]
pub struct StaticBindingEntry {
    pub prefix: Ipv4Network,
    pub static_in_label: Option<Label>,
    pub static_lsps: Vec<(Ipv4Addr, Label)>,
}

impl Engine {
    // All prefixes whose active route currently carries a programmed
    // incoming label and a selected outgoing LSP. Implicit Null is
    // never programmed as an incoming label (invariant 5), so a
    // prefix whose selected incoming label is Implicit Null is
    // excluded here rather than reported as if it were. An outgoing
    // Implicit Null LSP is reported normally, with
    // `OutTreatment::Pop`.
    pub fn forwarding_view(&self, rib: &dyn Rib) -> Vec<ForwardingEntry> {
        self.bindings_iter()
            .filter_map(|(prefix, bindings)| {
                let nexthop = rib.active_nexthop(*prefix)?;
                let in_label = bindings.selected_in_label?;
                if in_label.is_implicit_null() {
                    return None;
                }
                let lsp = bindings.selected_lsp()?;
                let out = if lsp.out_label.is_implicit_null() {
                    OutTreatment::Pop
                } else {
                    OutTreatment::Push(lsp.out_label)
                };
                Some(ForwardingEntry {
                    prefix: *prefix,
                    in_label,
                    out,
                    nexthop,
                    out_iface: lsp.out_iface.clone(),
                })
            })
            .collect()
    }

    // Every prefix with at least one binding recorded, whether or not
    // its route is currently active.
    pub fn binding_view(&self) -> Vec<BindingEntry> {
        self.bindings_iter()
            .map(|(prefix, bindings)| {
                let lsp = bindings.selected_lsp();
                BindingEntry {
                    prefix: *prefix,
                    in_label: bindings.selected_in_label,
                    out_label: lsp.map(|lsp| lsp.out_label),
                    lsr_id: lsp.map(|lsp| lsp.nexthop),
                }
            })
            .collect()
    }

    // Every prefix with a configured static binding, for the static
    // configuration dumper. Unaffected by route state or by whether
    // a dynamic binding currently shadows or is shadowed.
    pub fn static_binding_view(&self) -> Vec<StaticBindingEntry> {
        self.bindings_iter()
            .filter(|(_, bindings)| {
                bindings.static_in_label.is_some() || !bindings.static_lsps.is_empty()
            })
            .map(|(prefix, bindings)| StaticBindingEntry {
                prefix: *prefix,
                static_in_label: bindings.static_in_label,
                static_lsps: bindings
                    .static_lsps
                    .iter()
                    .map(|(nexthop, lsp)| (*nexthop, lsp.out_label))
                    .collect(),
            })
            .collect()
    }
}
