//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Test doubles for the forwarding-plane driver and the RIB, gated
//! behind the `testing` feature so they never ship in a production
//! build. Exercised directly by the scenarios in spec.md §8.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::bindings::Lsp;
use crate::driver::{Driver, DriverResult, NhlfeHandle};
use crate::label::Label;
use crate::rib::Rib;

// A call-recording driver: every operation succeeds unless poisoned
// through `fail_next`, and every call is appended to `calls` for the
// test to assert against (e.g. "exactly one `XcInstall` for label
// 100").
#[derive(Debug, Default)]
pub struct MockDriver {
    next_handle: u32,
    pub calls: Vec<DriverCall>,
    fail_next: Option<DriverCallKind>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DriverCall {
    SetInterfaceLabelspace(String, i32),
    IlmInstall(Label),
    IlmRemove(Label),
    NhlfeInstall(Ipv4Addr, Label),
    NhlfeRemove(Ipv4Addr, Label),
    XcInstall(Label, Ipv4Addr, Label),
    XcRemove(Label, Ipv4Addr, Label),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverCallKind {
    IlmInstall,
    NhlfeInstall,
    XcInstall,
}

impl MockDriver {
    pub fn new() -> MockDriver {
        MockDriver::default()
    }

    // Makes the next call of `kind` fail with `DriverError`, then
    // resume succeeding. Used to exercise the transactional rollback
    // in `crossconnect::CrossConnects::add`.
    pub fn fail_next(&mut self, kind: DriverCallKind) {
        self.fail_next = Some(kind);
    }

    pub fn count(&self, f: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.iter().filter(|call| f(call)).count()
    }

    fn should_fail(&mut self, kind: DriverCallKind) -> bool {
        if self.fail_next == Some(kind) {
            self.fail_next = None;
            true
        } else {
            false
        }
    }
}

impl Driver for MockDriver {
    fn set_interface_labelspace(
        &mut self,
        iface: &str,
        labelspace: i32,
    ) -> DriverResult {
        self.calls.push(DriverCall::SetInterfaceLabelspace(
            iface.to_owned(),
            labelspace,
        ));
        Ok(())
    }

    fn nhlfe_install(&mut self, lsp: &mut Lsp) -> DriverResult {
        if self.should_fail(DriverCallKind::NhlfeInstall) {
            return Err(crate::driver::DriverError);
        }
        if lsp.out_iface.is_none() {
            lsp.out_iface = Some(format!("via-{}", lsp.nexthop));
        }
        self.next_handle += 1;
        lsp.driver_handle = Some(NhlfeHandle(self.next_handle));
        self.calls
            .push(DriverCall::NhlfeInstall(lsp.nexthop, lsp.out_label));
        Ok(())
    }

    fn nhlfe_remove(&mut self, lsp: &mut Lsp) -> DriverResult {
        lsp.driver_handle = None;
        self.calls
            .push(DriverCall::NhlfeRemove(lsp.nexthop, lsp.out_label));
        Ok(())
    }

    fn xc_install(&mut self, label: Label, lsp: &Lsp) -> DriverResult {
        if self.should_fail(DriverCallKind::XcInstall) {
            return Err(crate::driver::DriverError);
        }
        self.calls
            .push(DriverCall::XcInstall(label, lsp.nexthop, lsp.out_label));
        Ok(())
    }

    fn xc_remove(&mut self, label: Label, lsp: &Lsp) -> DriverResult {
        self.calls
            .push(DriverCall::XcRemove(label, lsp.nexthop, lsp.out_label));
        Ok(())
    }

    fn ilm_install_impl(&mut self, label: Label) -> DriverResult {
        if self.should_fail(DriverCallKind::IlmInstall) {
            return Err(crate::driver::DriverError);
        }
        self.calls.push(DriverCall::IlmInstall(label));
        Ok(())
    }

    fn ilm_remove_impl(&mut self, label: Label) -> DriverResult {
        self.calls.push(DriverCall::IlmRemove(label));
        Ok(())
    }
}

// A RIB double whose active routes are set directly by the test,
// standing in for a live IP routing table. A route can be active with
// no gateway next-hop (a blackhole or directly-connected route, per
// spec.md §4.3 `select_lsp` step 1) by installing it through
// `install_no_nexthop` rather than `install`.
#[derive(Debug, Default)]
pub struct FakeRib {
    routes: RefCell<HashMap<Ipv4Network, Option<Ipv4Addr>>>,
    pub reeval_requests: RefCell<Vec<Ipv4Network>>,
}

impl FakeRib {
    pub fn new() -> FakeRib {
        FakeRib::default()
    }

    pub fn install(&self, prefix: Ipv4Network, nexthop: Ipv4Addr) {
        self.routes.borrow_mut().insert(prefix, Some(nexthop));
    }

    pub fn install_no_nexthop(&self, prefix: Ipv4Network) {
        self.routes.borrow_mut().insert(prefix, None);
    }

    pub fn withdraw(&self, prefix: Ipv4Network) {
        self.routes.borrow_mut().remove(&prefix);
    }
}

impl Rib for FakeRib {
    fn is_active(&self, prefix: Ipv4Network) -> bool {
        self.routes.borrow().contains_key(&prefix)
    }

    fn active_nexthop(&self, prefix: Ipv4Network) -> Option<Ipv4Addr> {
        self.routes.borrow().get(&prefix).copied().flatten()
    }

    fn request_ftn_reeval(&self, prefix: Ipv4Network) {
        self.reeval_requests.borrow_mut().push(prefix);
    }
}
