//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::Ipv4Network;

use holo_mpls::testing::{DriverCall, FakeRib, MockDriver};
use holo_mpls::{ClientBroadcast, Engine, Label, MutatorOutcome, MutatorWarning};

struct NullBus;
impl ClientBroadcast for NullBus {
    fn local_binding_changed(&self, _prefix: Ipv4Network, _label: Option<Label>) {}
}

fn prefix() -> Ipv4Network {
    "10.0.0.0/8".parse().unwrap()
}

fn nexthop() -> std::net::Ipv4Addr {
    "192.0.2.1".parse().unwrap()
}

// Scenario 1 (spec.md §8): a static input label configured before the
// route exists, then the route appears.
#[test]
fn static_in_label_before_route_then_route_installed() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    let outcome =
        engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    assert_eq!(outcome, MutatorOutcome::Applied);
    assert!(driver.calls.is_empty(), "no driver calls while route is down");

    rib.install(prefix(), nexthop());
    engine.on_route_installed(&rib, &mut driver, prefix());

    assert_eq!(driver.count(|c| matches!(c, DriverCall::IlmInstall(l) if *l == Label::new(100))), 1);
    assert_eq!(driver.count(|c| matches!(c, DriverCall::NhlfeInstall(..))), 0);
}

// Continuation of scenario 1: adding a static LSP for the active
// next-hop installs the NHLFE and wires it to the already-programmed
// incoming label.
#[test]
fn add_static_lsp_while_active_installs_nhlfe_and_xc() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    rib.install(prefix(), nexthop());
    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    engine.on_route_installed(&rib, &mut driver, prefix());

    let outcome =
        engine.add_static_lsp(&rib, &mut driver, prefix(), nexthop(), Label::new(200));
    assert_eq!(outcome, MutatorOutcome::Applied);

    assert_eq!(
        driver.count(|c| matches!(c, DriverCall::NhlfeInstall(nh, l)
            if *nh == nexthop() && *l == Label::new(200))),
        1
    );
    assert_eq!(
        driver.count(|c| matches!(c, DriverCall::XcInstall(il, nh, ol)
            if *il == Label::new(100) && *nh == nexthop() && *ol == Label::new(200))),
        1
    );

    let forwarding = engine.forwarding_view(&rib);
    assert_eq!(forwarding.len(), 1);
    assert_eq!(forwarding[0].in_label, Label::new(100));
}

// Scenario 4 (spec.md §8): an active route with an installed LSP is
// withdrawn, then reinstalled with the same next-hop.
#[test]
fn route_withdrawal_uninstalls_and_reinstall_restores() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    rib.install(prefix(), nexthop());
    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    engine.on_route_installed(&rib, &mut driver, prefix());
    engine.add_static_lsp(&rib, &mut driver, prefix(), nexthop(), Label::new(200));

    rib.withdraw(prefix());
    engine.on_route_uninstalled(&mut driver, prefix());

    assert_eq!(driver.count(|c| matches!(c, DriverCall::XcRemove(..))), 1);
    assert_eq!(driver.count(|c| matches!(c, DriverCall::NhlfeRemove(..))), 1);
    assert_eq!(driver.count(|c| matches!(c, DriverCall::IlmRemove(..))), 1);
    assert!(engine.forwarding_view(&rib).is_empty());

    // The configured bindings survive the withdrawal.
    let statics = engine.static_binding_view();
    assert_eq!(statics.len(), 1);
    assert_eq!(statics[0].static_in_label, Some(Label::new(100)));

    rib.install(prefix(), nexthop());
    engine.on_route_installed(&rib, &mut driver, prefix());

    let forwarding = engine.forwarding_view(&rib);
    assert_eq!(forwarding.len(), 1);
    assert_eq!(forwarding[0].in_label, Label::new(100));
    assert_eq!(forwarding[0].nexthop, nexthop());
}

#[test]
fn set_static_in_label_is_idempotent() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    let outcome =
        engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    assert_eq!(
        outcome,
        MutatorOutcome::Warning(MutatorWarning::NoChange)
    );
}

#[test]
fn clear_static_in_label_with_mismatched_label_is_rejected() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    let outcome = engine.clear_static_in_label(
        &rib,
        &mut driver,
        &bus,
        prefix(),
        Some(Label::new(999)),
    );
    assert_eq!(
        outcome,
        MutatorOutcome::Warning(MutatorWarning::LabelMismatch)
    );
}

// When a static label is cleared and a dynamic label is already
// recorded underneath it, the dynamic label takes over as the
// selected incoming label (invariant 1).
#[test]
fn clearing_static_in_label_falls_back_to_dynamic() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    rib.install(prefix(), nexthop());
    engine.set_dynamic_in_label(&rib, &mut driver, prefix(), Some(Label::new(500)));
    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));

    engine.clear_static_in_label(&rib, &mut driver, &bus, prefix(), None);

    let bindings = engine.binding_view();
    assert_eq!(bindings[0].in_label, Some(Label::new(500)));
    // Once after the initial dynamic-in-label set, once more after the
    // static label is cleared and the dynamic one takes back over.
    assert_eq!(
        driver.count(|c| matches!(c, DriverCall::IlmInstall(l) if *l == Label::new(500))),
        2
    );
}

// A static label recorded while the route is inactive still takes
// effect in the value of `selected_in_label`, even though no driver
// call is made until the route becomes active (invariant 1 holds
// regardless of route state).
#[test]
fn selected_in_label_tracks_static_even_while_inactive() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    engine.set_dynamic_in_label(&rib, &mut driver, prefix(), Some(Label::new(500)));
    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    engine.clear_static_in_label(&rib, &mut driver, &bus, prefix(), None);

    let bindings = engine.binding_view();
    assert_eq!(bindings[0].in_label, Some(Label::new(500)));
    assert!(driver.calls.is_empty(), "route never became active");
}

// `select_lsp` checks the dynamic slot before the static map (spec.md
// §4.3 step 2), so a dynamic LSP for the same next-hop always wins
// over a static one, and the switch tears down the previously
// installed NHLFE/XC before installing the new one.
#[test]
fn dynamic_lsp_wins_over_static_for_the_same_nexthop() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();

    rib.install(prefix(), nexthop());
    engine.add_static_lsp(&rib, &mut driver, prefix(), nexthop(), Label::new(200));
    engine.set_dynamic_lsp(&rib, &mut driver, prefix(), nexthop(), Label::new(300));

    let bindings = engine.binding_view();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].out_label, Some(Label::new(300)));
    assert_eq!(
        driver.count(|c| matches!(c, DriverCall::NhlfeInstall(_, l) if *l == Label::new(300))),
        1
    );
    assert_eq!(driver.count(|c| matches!(c, DriverCall::NhlfeRemove(..))), 1);
}

// A route can be active with no IPv4 gateway next-hop (a blackhole or
// directly-connected route, spec.md §4.3 `select_lsp` step 1). The
// incoming label must still be programmed and broadcast in that case
// (invariant 4) even though there is no next-hop for `select_lsp` to
// pick an outgoing LSP against.
#[test]
fn static_in_label_installs_on_active_route_with_no_nexthop() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    rib.install_no_nexthop(prefix());
    let outcome =
        engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));

    assert_eq!(outcome, MutatorOutcome::Applied);
    assert_eq!(
        driver.count(|c| matches!(c, DriverCall::IlmInstall(l) if *l == Label::new(100))),
        1
    );
    assert_eq!(driver.count(|c| matches!(c, DriverCall::NhlfeInstall(..))), 0);
}

#[test]
fn remove_static_lsp_triggers_reselection() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    rib.install(prefix(), nexthop());
    engine.set_static_in_label(&rib, &mut driver, &bus, prefix(), Label::new(100));
    engine.on_route_installed(&rib, &mut driver, prefix());
    engine.add_static_lsp(&rib, &mut driver, prefix(), nexthop(), Label::new(200));
    assert_eq!(engine.forwarding_view(&rib).len(), 1);

    engine.remove_static_lsp(&rib, &mut driver, prefix(), nexthop());
    assert!(engine.forwarding_view(&rib).is_empty());
    assert_eq!(driver.count(|c| matches!(c, DriverCall::NhlfeRemove(..))), 1);
}

// Implicit Null is never programmed as an incoming label (invariant
// 5), so a prefix selecting it as its incoming label must not show up
// in the forwarding view even though `selected_in_label` is `Some`.
#[test]
fn forwarding_view_excludes_implicit_null_incoming_label() {
    let mut engine = Engine::new();
    let mut driver = MockDriver::new();
    let rib = FakeRib::new();
    let bus = NullBus;

    rib.install(prefix(), nexthop());
    engine.set_static_in_label(
        &rib,
        &mut driver,
        &bus,
        prefix(),
        Label::new(Label::IMPLICIT_NULL),
    );
    engine.on_route_installed(&rib, &mut driver, prefix());
    engine.add_static_lsp(&rib, &mut driver, prefix(), nexthop(), Label::new(200));

    assert!(engine.forwarding_view(&rib).is_empty());
}
