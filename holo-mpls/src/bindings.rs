//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::driver::NhlfeHandle;
use crate::label::Label;

// An outgoing binding: a next-hop plus the label to push towards it.
//
// Two `Lsp` values are the same identity iff their next-hop addresses
// are equal (spec.md §3); the outgoing label may differ between two
// updates to the same identity, which is why `add_static_lsp` and
// `set_dynamic_lsp` always remove-then-add rather than mutating the
// label of an installed entry in place.
#[derive(Clone, Debug)]
pub struct Lsp {
    pub nexthop: Ipv4Addr,
    pub out_label: Label,
    // Resolved lazily from `nexthop` by the driver right before
    // install; `None` until then.
    pub out_iface: Option<String>,
    // Opaque handle assigned by `Driver::nhlfe_install`, cleared by
    // `Driver::nhlfe_remove`. Its presence is this crate's only
    // evidence that the NHLFE is programmed.
    pub(crate) driver_handle: Option<NhlfeHandle>,
}

impl Lsp {
    pub fn new(nexthop: Ipv4Addr, out_label: Label) -> Lsp {
        Lsp {
            nexthop,
            out_label,
            out_iface: None,
            driver_handle: None,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.driver_handle.is_some()
    }
}

// Which of the two LSP sources `selected_lsp` currently points at.
//
// Design note (spec.md §9): the teacher's C ancestor aliases a raw
// pointer into either the static list or the dynamic slot. Here the
// selection is a discriminated reference instead of an independent
// copy or a pointer, so lookups always go back through the owning
// `LabelBindings` rather than risking the pointed-to `Lsp` drifting
// out of sync with its source of truth.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectedLsp {
    Dynamic,
    Static(Ipv4Addr),
}

// Per-prefix MPLS state (spec.md §3). Created on first binding
// operation for a prefix and never freed on removal of its last
// binding; its lifetime is bounded by the RIB node it is attached to
// (owned externally, outside this crate, see `rib::Rib`).
#[derive(Clone, Debug, Default)]
pub struct LabelBindings {
    pub static_in_label: Option<Label>,
    pub dynamic_in_label: Option<Label>,
    pub selected_in_label: Option<Label>,

    pub static_lsps: BTreeMap<Ipv4Addr, Lsp>,
    pub dynamic_lsp: Option<Lsp>,
    pub(crate) selected_lsp: Option<SelectedLsp>,
}

impl LabelBindings {
    pub fn new() -> LabelBindings {
        LabelBindings::default()
    }

    // Resolves `selected_lsp` to the `Lsp` it currently refers to, if
    // any.
    pub fn selected_lsp(&self) -> Option<&Lsp> {
        match self.selected_lsp? {
            SelectedLsp::Dynamic => self.dynamic_lsp.as_ref(),
            SelectedLsp::Static(nexthop) => self.static_lsps.get(&nexthop),
        }
    }

    pub(crate) fn selected_lsp_mut(&mut self) -> Option<&mut Lsp> {
        match self.selected_lsp? {
            SelectedLsp::Dynamic => self.dynamic_lsp.as_mut(),
            SelectedLsp::Static(nexthop) => self.static_lsps.get_mut(&nexthop),
        }
    }

    // Whether this record has any binding left worth keeping around
    // (used only for diagnostics; the record itself is never dropped
    // as a result of this being false, see spec.md §3 Lifecycle).
    pub fn is_empty(&self) -> bool {
        self.static_in_label.is_none()
            && self.dynamic_in_label.is_none()
            && self.static_lsps.is_empty()
            && self.dynamic_lsp.is_none()
    }

    // Invariant 1 (spec.md §8): recomputes what `selected_in_label`
    // must be from the static/dynamic sources, static taking
    // precedence.
    pub(crate) fn expected_selected_in_label(&self) -> Option<Label> {
        self.static_in_label.or(self.dynamic_in_label)
    }
}

#[cfg(feature = "testing")]
impl LabelBindings {
    pub fn set_selected_lsp_for_test(&mut self, selected: Option<SelectedLsp>) {
        self.selected_lsp = selected;
    }

    pub fn expected_selected_in_label_for_test(&self) -> Option<Label> {
        self.expected_selected_in_label()
    }
}
