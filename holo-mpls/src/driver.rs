//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::bindings::Lsp;
use crate::label::Label;

// Opaque handle returned by `Driver::nhlfe_install`, analogous to the
// `nhlfe_index` the kernel returns to `mpls_kernel_nhlfe_register` in
// the Quagga ancestor of this crate (`zebra/mpls_netlink.c`). This
// crate never interprets the handle's value; it only stores it and
// hands it back on removal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NhlfeHandle(pub u32);

// A driver-level error. The driver is stateless from this crate's
// point of view (spec.md §4.5): a failure is reported once, through
// this type, and this crate never asks "what have you got?" of the
// driver afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DriverError;

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "forwarding-plane driver call failed")
    }
}

impl std::error::Error for DriverError {}

pub type DriverResult = Result<(), DriverError>;

// The abstract forwarding-plane programmer (spec.md §4.5). An
// embedding daemon implements this trait over whatever transport it
// uses to reach the kernel (netlink genl in the Quagga ancestor); this
// crate never depends on a specific wire format.
pub trait Driver {
    // Enables MPLS on an interface (`labelspace >= 0`) or disables it
    // (`labelspace < 0`).
    fn set_interface_labelspace(
        &mut self,
        iface: &str,
        labelspace: i32,
    ) -> DriverResult;

    // Creates an Incoming Label Map entry for `label`. A no-op for
    // Implicit Null, whose pop is implicit on the receiving side
    // (spec.md §3 invariant 5).
    fn ilm_install(&mut self, label: Label) -> DriverResult {
        if label.is_implicit_null() {
            return Ok(());
        }
        self.ilm_install_impl(label)
    }

    // Undoes `ilm_install`. Also a no-op for Implicit Null.
    fn ilm_remove(&mut self, label: Label) -> DriverResult {
        if label.is_implicit_null() {
            return Ok(());
        }
        self.ilm_remove_impl(label)
    }

    // Creates a Next-Hop Label Forwarding Entry for `lsp`: resolves
    // the outgoing interface from the next-hop if not already set,
    // programs a pop-only instruction for Implicit Null or a push of
    // `lsp.out_label` otherwise, and records the returned handle on
    // `lsp`.
    fn nhlfe_install(&mut self, lsp: &mut Lsp) -> DriverResult;

    // Removes the NHLFE identified by `lsp`'s driver handle and clears
    // it.
    fn nhlfe_remove(&mut self, lsp: &mut Lsp) -> DriverResult;

    // Wires `label` (an ILM) to the NHLFE already installed for `lsp`.
    fn xc_install(&mut self, label: Label, lsp: &Lsp) -> DriverResult;

    // Undoes `xc_install`.
    fn xc_remove(&mut self, label: Label, lsp: &Lsp) -> DriverResult;

    // Non-Implicit-Null halves of `ilm_install`/`ilm_remove`, left to
    // the implementer; the Implicit Null short-circuit above is common
    // to every driver and is not worth repeating in each impl.
    fn ilm_install_impl(&mut self, label: Label) -> DriverResult;
    fn ilm_remove_impl(&mut self, label: Label) -> DriverResult;
}

// A driver that programs nothing and never fails. Useful for running
// the engine without a live forwarding plane (the Rust equivalent of
// `zebra/mpls_null.c`'s build-time stand-in for platforms lacking
// genetlink MPLS support), or as a base to wrap with instrumentation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDriver {
    next_handle: u32,
}

impl Driver for NullDriver {
    fn set_interface_labelspace(
        &mut self,
        _iface: &str,
        _labelspace: i32,
    ) -> DriverResult {
        Ok(())
    }

    fn nhlfe_install(&mut self, lsp: &mut Lsp) -> DriverResult {
        self.next_handle += 1;
        lsp.driver_handle = Some(NhlfeHandle(self.next_handle));
        Ok(())
    }

    fn nhlfe_remove(&mut self, lsp: &mut Lsp) -> DriverResult {
        lsp.driver_handle = None;
        Ok(())
    }

    fn xc_install(&mut self, _label: Label, _lsp: &Lsp) -> DriverResult {
        Ok(())
    }

    fn xc_remove(&mut self, _label: Label, _lsp: &Lsp) -> DriverResult {
        Ok(())
    }

    fn ilm_install_impl(&mut self, _label: Label) -> DriverResult {
        Ok(())
    }

    fn ilm_remove_impl(&mut self, _label: Label) -> DriverResult {
        Ok(())
    }
}
