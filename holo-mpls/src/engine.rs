//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::bindings::{LabelBindings, Lsp, SelectedLsp};
use crate::broadcast::ClientBroadcast;
use crate::crossconnect::CrossConnects;
use crate::debug::Debug;
use crate::driver::Driver;
use crate::error::{Error, MutatorOutcome, MutatorWarning};
use crate::label::Label;
use crate::rib::Rib;

// The MPLS LIB reconciliation engine: owns every prefix's label
// bindings and the static cross-connect table, and keeps the
// forwarding plane in lockstep with them through the driver trait.
//
// Single-threaded and synchronous throughout (spec.md §5): every
// public method here runs to completion before returning, never
// suspends, and is never re-entered from within a `Driver` callback.
pub struct Engine {
    mpls_enabled: bool,
    bindings: BTreeMap<Ipv4Network, LabelBindings>,
    cross_connects: CrossConnects,
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            mpls_enabled: false,
            bindings: BTreeMap::new(),
            cross_connects: CrossConnects::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mpls_enabled
    }

    pub fn cross_connects(&self) -> &CrossConnects {
        &self.cross_connects
    }

    pub fn cross_connects_mut(&mut self) -> &mut CrossConnects {
        &mut self.cross_connects
    }

    pub(crate) fn bindings_iter(
        &self,
    ) -> impl Iterator<Item = (&Ipv4Network, &LabelBindings)> {
        self.bindings.iter()
    }

    fn get_or_create(&mut self, prefix: Ipv4Network) -> &mut LabelBindings {
        self.bindings.entry(prefix).or_insert_with(|| {
            Debug::BindingsCreate(&prefix).log();
            LabelBindings::new()
        })
    }

    // ---- Static incoming label -------------------------------------

    pub fn set_static_in_label(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        bus: &dyn ClientBroadcast,
        prefix: Ipv4Network,
        label: Label,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let bindings = self.get_or_create(prefix);

        if bindings.static_in_label == Some(label) {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        }

        let old_selected = bindings.selected_in_label;
        if active {
            if let Some(old_label) = old_selected {
                uninstall_in_label(bindings, driver, prefix, old_label);
            }
        }

        bindings.static_in_label = Some(label);
        bindings.selected_in_label = Some(label);
        Debug::StaticInLabelSet(&prefix, label).log();
        Debug::SelectedInLabelChanged(&prefix, old_selected, Some(label)).log();

        if active {
            install_in_label(bindings, driver, prefix, label);
            bus.local_binding_changed(prefix, Some(label));
        }

        MutatorOutcome::Applied
    }

    pub fn clear_static_in_label(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        bus: &dyn ClientBroadcast,
        prefix: Ipv4Network,
        label: Option<Label>,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let Some(bindings) = self.bindings.get_mut(&prefix) else {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        };

        let Some(current) = bindings.static_in_label else {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        };
        if let Some(requested) = label {
            if requested != current {
                return MutatorOutcome::Warning(MutatorWarning::LabelMismatch);
            }
        }

        let old_selected = bindings.selected_in_label;
        if active {
            if let Some(old_label) = old_selected {
                uninstall_in_label(bindings, driver, prefix, old_label);
            }
        }

        bindings.static_in_label = None;
        let new_selected = bindings.expected_selected_in_label();
        bindings.selected_in_label = new_selected;
        Debug::StaticInLabelCleared(&prefix).log();
        Debug::SelectedInLabelChanged(&prefix, old_selected, new_selected).log();

        if active {
            if let Some(new_label) = new_selected {
                install_in_label(bindings, driver, prefix, new_label);
            }
            bus.local_binding_changed(prefix, new_selected);
        }

        MutatorOutcome::Applied
    }

    // ---- Dynamic incoming label -------------------------------------

    // `label` of `None` records that the dynamic label-distribution
    // protocol has withdrawn its binding for `prefix`; Quagga's
    // ancestor and this crate both record that unconditionally, even
    // while a static label currently shadows it (spec.md §9 Open
    // Question 1, confirmed against `mpls_prefix_set_ldp_input_label`,
    // which assigns `lb->ldp_in_label` before ever consulting
    // `lb->static_in_label`).
    pub fn set_dynamic_in_label(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
        label: Option<Label>,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let bindings = self.get_or_create(prefix);

        bindings.dynamic_in_label = label;
        match label {
            Some(l) => Debug::DynamicInLabelSet(&prefix, l).log(),
            None => Debug::DynamicInLabelCleared(&prefix).log(),
        }

        if bindings.static_in_label.is_some() {
            return MutatorOutcome::Applied;
        }
        if label == bindings.selected_in_label {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        }

        let old_selected = bindings.selected_in_label;
        if active {
            if let Some(old_label) = old_selected {
                uninstall_in_label(bindings, driver, prefix, old_label);
            }
            if let Some(new_label) = label {
                install_in_label(bindings, driver, prefix, new_label);
            }
        }
        bindings.selected_in_label = label;
        Debug::SelectedInLabelChanged(&prefix, old_selected, label).log();

        MutatorOutcome::Applied
    }

    // ---- Static LSPs --------------------------------------------------

    pub fn add_static_lsp(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
        nexthop: Ipv4Addr,
        out_label: Label,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let bindings = self.get_or_create(prefix);
        let needs_replace = match bindings.static_lsps.get(&nexthop) {
            Some(existing) if existing.out_label == out_label => {
                return MutatorOutcome::Warning(MutatorWarning::NoChange);
            }
            Some(_) => true,
            None => false,
        };
        if needs_replace {
            self.remove_static_lsp(rib, driver, prefix, nexthop);
        }

        let bindings = self.get_or_create(prefix);
        bindings.static_lsps.insert(nexthop, Lsp::new(nexthop, out_label));
        Debug::StaticLspAdded(&prefix, &nexthop, out_label).log();

        if active {
            self.select_lsp(rib, driver, prefix);
        }

        MutatorOutcome::Applied
    }

    pub fn remove_static_lsp(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
        nexthop: Ipv4Addr,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let Some(bindings) = self.bindings.get_mut(&prefix) else {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        };
        if !bindings.static_lsps.contains_key(&nexthop) {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        }

        if bindings.selected_lsp == Some(SelectedLsp::Static(nexthop)) {
            self.uninstall_lsp(driver, prefix);
        }

        let bindings = self.bindings.get_mut(&prefix).unwrap();
        bindings.static_lsps.remove(&nexthop);
        Debug::StaticLspRemoved(&prefix, &nexthop).log();

        if active {
            self.select_lsp(rib, driver, prefix);
        }

        MutatorOutcome::Applied
    }

    // ---- Dynamic LSP --------------------------------------------------

    pub fn set_dynamic_lsp(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
        nexthop: Ipv4Addr,
        out_label: Label,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let bindings = self.get_or_create(prefix);
        if let Some(existing) = &bindings.dynamic_lsp {
            if existing.nexthop == nexthop && existing.out_label == out_label {
                return MutatorOutcome::Warning(MutatorWarning::NoChange);
            }
        }
        let was_selected = bindings.selected_lsp == Some(SelectedLsp::Dynamic);
        if was_selected {
            self.uninstall_lsp(driver, prefix);
        }

        let bindings = self.get_or_create(prefix);
        bindings.dynamic_lsp = Some(Lsp::new(nexthop, out_label));
        Debug::DynamicLspSet(&prefix, &nexthop, out_label).log();

        if active {
            self.select_lsp(rib, driver, prefix);
        }

        MutatorOutcome::Applied
    }

    pub fn clear_dynamic_lsp(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
        nexthop: Ipv4Addr,
        out_label: Label,
    ) -> MutatorOutcome {
        let active = rib.is_active(prefix);
        let Some(bindings) = self.bindings.get_mut(&prefix) else {
            return MutatorOutcome::Warning(MutatorWarning::NoChange);
        };
        match &bindings.dynamic_lsp {
            Some(lsp) if lsp.nexthop == nexthop && lsp.out_label == out_label => {}
            Some(_) => return MutatorOutcome::Warning(MutatorWarning::LspMismatch),
            None => return MutatorOutcome::Warning(MutatorWarning::NoChange),
        }

        if bindings.selected_lsp == Some(SelectedLsp::Dynamic) {
            self.uninstall_lsp(driver, prefix);
        }

        let bindings = self.bindings.get_mut(&prefix).unwrap();
        bindings.dynamic_lsp = None;
        Debug::DynamicLspCleared(&prefix, &nexthop).log();

        if active {
            self.select_lsp(rib, driver, prefix);
        }

        MutatorOutcome::Applied
    }

    // ---- RIB transition hooks -----------------------------------------

    // Called once a route for `prefix` becomes the active route
    // (spec.md §4.3). Re-programs the incoming label, if any is
    // configured, and runs selection for the outgoing side.
    pub fn on_route_installed(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
    ) {
        Debug::RouteInstalled(&prefix).log();
        let Some(bindings) = self.bindings.get_mut(&prefix) else {
            return;
        };
        if let Some(label) = bindings.selected_in_label {
            if let Err(source) = driver.ilm_install(label) {
                Error::DriverCallFailed(prefix, source).log();
            }
        }
        self.select_lsp(rib, driver, prefix);
    }

    // Called once the active route for `prefix` is withdrawn. Tears
    // down whatever was programmed; the label bindings themselves
    // (static/dynamic configuration) are untouched; only the
    // forwarding-plane programming for them goes away (spec.md §4.3,
    // §8 scenario 4).
    pub fn on_route_uninstalled(
        &mut self,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
    ) {
        Debug::RouteUninstalled(&prefix).log();
        let Some(bindings) = self.bindings.get_mut(&prefix) else {
            return;
        };

        if bindings.selected_lsp.is_some() {
            self.uninstall_lsp(driver, prefix);
        }

        let Some(bindings) = self.bindings.get_mut(&prefix) else {
            return;
        };
        if let Some(label) = bindings.selected_in_label {
            if let Err(source) = driver.ilm_remove(label) {
                Error::DriverCallFailed(prefix, source).log();
            }
        }
    }

    // ---- Internal algorithms -------------------------------------------

    // Chooses which LSP (if any) is the outgoing binding for `prefix`,
    // given the RIB's currently active next-hop, and reconciles the
    // forwarding plane to match (spec.md §4.3).
    fn select_lsp(
        &mut self,
        rib: &dyn Rib,
        driver: &mut dyn Driver,
        prefix: Ipv4Network,
    ) {
        let Some(nexthop) = rib.active_nexthop(prefix) else {
            Debug::NoActiveNexthop(&prefix).log();
            return;
        };

        let bindings = self.bindings.get_mut(&prefix).unwrap();
        let candidate = if bindings
            .dynamic_lsp
            .as_ref()
            .is_some_and(|lsp| lsp.nexthop == nexthop)
        {
            Some(SelectedLsp::Dynamic)
        } else if bindings.static_lsps.contains_key(&nexthop) {
            Some(SelectedLsp::Static(nexthop))
        } else {
            None
        };

        if candidate == bindings.selected_lsp {
            return;
        }

        if bindings.selected_lsp.is_some() {
            self.uninstall_lsp(driver, prefix);
        }

        let bindings = self.bindings.get_mut(&prefix).unwrap();
        bindings.selected_lsp = candidate;
        if candidate.is_none() {
            Debug::LspUnselected(&prefix).log();
            return;
        }

        let lsp = bindings.selected_lsp_mut().unwrap();
        Debug::LspSelected(&prefix, &nexthop, lsp.out_label).log();
        if let Err(source) = driver.nhlfe_install(lsp) {
            Error::DriverCallFailed(prefix, source).log();
            return;
        }

        let bindings = self.bindings.get(&prefix).unwrap();
        if let Some(in_label) = bindings.selected_in_label {
            let lsp = bindings.selected_lsp().unwrap();
            if let Err(source) = driver.xc_install(in_label, lsp) {
                Error::DriverCallFailed(prefix, source).log();
            }
        }

        rib.request_ftn_reeval(prefix);
    }

    // Tears down the currently-selected LSP's forwarding-plane state
    // (XC, then NHLFE) and clears the selection pointer.
    //
    // Invariant 2 (spec.md §8) guarantees `selected_lsp` is only ever
    // `Some` while the route is active, so unlike the incoming-label
    // helpers below this never needs to re-query the RIB: being
    // selected at all is already proof the forwarding plane currently
    // holds this LSP's NHLFE (and, if an incoming label is selected,
    // its XC).
    fn uninstall_lsp(&mut self, driver: &mut dyn Driver, prefix: Ipv4Network) {
        let bindings = self.bindings.get_mut(&prefix).unwrap();
        let Some(discriminant) = bindings.selected_lsp else {
            return;
        };

        if let Some(in_label) = bindings.selected_in_label {
            if let Some(lsp) = bindings.selected_lsp() {
                let lsp = lsp.clone();
                if let Err(source) = driver.xc_remove(in_label, &lsp) {
                    Error::DriverCallFailed(prefix, source).log();
                }
            }
        }

        let lsp = match discriminant {
            SelectedLsp::Dynamic => bindings.dynamic_lsp.as_mut(),
            SelectedLsp::Static(nexthop) => bindings.static_lsps.get_mut(&nexthop),
        };
        if let Some(lsp) = lsp {
            if let Err(source) = driver.nhlfe_remove(lsp) {
                Error::DriverCallFailed(prefix, source).log();
            }
        }

        bindings.selected_lsp = None;
    }

    // ---- Lifecycle ------------------------------------------------------

    // Enables MPLS processing: flips the process-wide flag and
    // programs a labelspace on every interface the caller says carries
    // MPLS traffic (spec.md §4.5, §7 "mpls_ip").
    pub fn enable<'a>(
        &mut self,
        driver: &mut dyn Driver,
        ifaces: impl Iterator<Item = &'a str>,
    ) {
        self.mpls_enabled = true;
        for iface in ifaces {
            if let Err(source) = driver.set_interface_labelspace(iface, 0) {
                tracing::warn!(%iface, error = %source, "failed to enable MPLS on interface");
            }
        }
    }

    pub fn disable<'a>(
        &mut self,
        driver: &mut dyn Driver,
        ifaces: impl Iterator<Item = &'a str>,
    ) {
        self.mpls_enabled = false;
        for iface in ifaces {
            if let Err(source) = driver.set_interface_labelspace(iface, -1) {
                tracing::warn!(%iface, error = %source, "failed to disable MPLS on interface");
            }
        }
    }

    // Full teardown: every cross-connect and every prefix's
    // forwarding-plane programming is removed, in no particular order
    // (spec.md §4.7 lifecycle, "mpls_close" in the Quagga ancestor).
    // The in-memory configuration (static bindings, static LSPs) is
    // left untouched; only the driver-visible state is unwound.
    pub fn shutdown<'a>(
        &mut self,
        driver: &mut dyn Driver,
        ifaces: impl Iterator<Item = &'a str>,
    ) {
        let labels: Vec<Label> =
            self.cross_connects.iter().map(|cc| cc.in_label).collect();
        for label in labels {
            let _ = self.cross_connects.remove(driver, label);
        }

        let prefixes: Vec<Ipv4Network> = self.bindings.keys().copied().collect();
        for prefix in prefixes {
            self.on_route_uninstalled(driver, prefix);
        }

        self.disable(driver, ifaces);
    }
}

fn install_in_label(
    bindings: &mut LabelBindings,
    driver: &mut dyn Driver,
    prefix: Ipv4Network,
    label: Label,
) {
    if let Err(source) = driver.ilm_install(label) {
        Error::DriverCallFailed(prefix, source).log();
    }
    if let Some(lsp) = bindings.selected_lsp() {
        let lsp = lsp.clone();
        if let Err(source) = driver.xc_install(label, &lsp) {
            Error::DriverCallFailed(prefix, source).log();
        }
    }
}

fn uninstall_in_label(
    bindings: &mut LabelBindings,
    driver: &mut dyn Driver,
    prefix: Ipv4Network,
    old_label: Label,
) {
    if let Some(lsp) = bindings.selected_lsp() {
        let lsp = lsp.clone();
        if let Err(source) = driver.xc_remove(old_label, &lsp) {
            Error::DriverCallFailed(prefix, source).log();
        }
    }
    if let Err(source) = driver.ilm_remove(old_label) {
        Error::DriverCallFailed(prefix, source).log();
    }
}
