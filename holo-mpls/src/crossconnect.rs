//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::bindings::Lsp;
use crate::debug::Debug;
use crate::driver::Driver;
use crate::error::Error;
use crate::label::Label;

// A label-to-label forwarding entry independent of IP routing
// (spec.md §3, §4.4). The incoming label is unique across the table;
// the LSP is owned by the entry (unlike a prefix's `selected_lsp`,
// which is always a reference into `static_lsps`/`dynamic_lsp`).
#[derive(Clone, Debug)]
pub struct CrossConnect {
    pub in_label: Label,
    pub lsp: Lsp,
}

// The static cross-connect table: a sequence keyed by incoming label
// (spec.md §3 "Process-wide state").
#[derive(Debug, Default)]
pub struct CrossConnects {
    entries: BTreeMap<Label, CrossConnect>,
}

impl CrossConnects {
    pub fn new() -> CrossConnects {
        CrossConnects::default()
    }

    pub fn get(&self, in_label: Label) -> Option<&CrossConnect> {
        self.entries.get(&in_label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrossConnect> {
        self.entries.values()
    }

    pub fn contains(&self, in_label: Label) -> bool {
        self.entries.contains_key(&in_label)
    }

    // Adds a cross-connect, replacing any prior entry with the same
    // incoming label but different content, and installing the
    // NHLFE/ILM/XC triple into the driver.
    //
    // On any installation step's failure, every step already completed
    // in this call is unwound in reverse order (spec.md §9 "Failure
    // without rollback"), leaving the in-memory table exactly as it
    // was before the call.
    pub fn add(
        &mut self,
        driver: &mut dyn Driver,
        in_label: Label,
        iface: &str,
        nexthop: Ipv4Addr,
        out_label: Label,
    ) -> Result<(), Error> {
        let mut replacing = false;
        if let Some(existing) = self.entries.get(&in_label) {
            let unchanged = existing.lsp.nexthop == nexthop
                && existing.lsp.out_label == out_label
                && existing.lsp.out_iface.as_deref() == Some(iface);
            if unchanged {
                return Ok(());
            }
            // Remove-and-continue: `remove` already logs and proceeds
            // past partial driver failures, so its result is not
            // propagated here.
            let _ = self.remove(driver, in_label);
            replacing = true;
        }

        let mut lsp = Lsp::new(nexthop, out_label);
        lsp.out_iface = Some(iface.to_owned());

        // Step 1: NHLFE.
        if let Err(source) = driver.nhlfe_install(&mut lsp) {
            return Err(Error::CrossConnectInstallFailed(in_label, source));
        }
        // Step 2: ILM.
        if let Err(source) = driver.ilm_install(in_label) {
            let _ = driver.nhlfe_remove(&mut lsp);
            return Err(Error::CrossConnectInstallFailed(in_label, source));
        }
        // Step 3: XC.
        if let Err(source) = driver.xc_install(in_label, &lsp) {
            let _ = driver.ilm_remove(in_label);
            let _ = driver.nhlfe_remove(&mut lsp);
            return Err(Error::CrossConnectInstallFailed(in_label, source));
        }

        if replacing {
            Debug::CrossConnectReplaced(in_label, &nexthop).log();
        } else {
            Debug::CrossConnectInstalled(in_label, &nexthop).log();
        }
        self.entries.insert(in_label, CrossConnect { in_label, lsp });
        Ok(())
    }

    // Removes a cross-connect. Always attempts all three driver
    // teardown calls (XC, then ILM, then NHLFE) regardless of earlier
    // failures: per spec.md §4.4, the in-memory state must not diverge
    // from an intent to remove, so partial driver failure is logged
    // and the entry is freed unconditionally.
    pub fn remove(
        &mut self,
        driver: &mut dyn Driver,
        in_label: Label,
    ) -> Result<(), Error> {
        let Some(cc) = self.entries.remove(&in_label) else {
            return Err(Error::CrossConnectNotFound(in_label));
        };

        if let Err(source) = driver.xc_remove(in_label, &cc.lsp) {
            Error::CrossConnectInstallFailed(in_label, source).log();
        }
        if let Err(source) = driver.ilm_remove(in_label) {
            Error::CrossConnectInstallFailed(in_label, source).log();
        }
        let mut lsp = cc.lsp;
        if let Err(source) = driver.nhlfe_remove(&mut lsp) {
            Error::CrossConnectInstallFailed(in_label, source).log();
        }

        Debug::CrossConnectRemoved(in_label).log();
        Ok(())
    }
}
