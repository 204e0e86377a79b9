//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

// Read-only view of the IP routing table this crate consumes (spec.md
// §1, §5: "the RIB is read-only to the engine"). An embedding daemon
// implements this over its own route table; this crate never mutates
// it and never caches what it returns across calls.
pub trait Rib {
    // Whether a route for `prefix` is the active route in the RIB
    // (`zebra_route_node_active` in the Quagga ancestor), independent
    // of whether that route carries a usable IPv4 gateway next-hop.
    // This gates ILM install/remove and the client broadcast (spec.md
    // §4.3's static/dynamic in-label mutators): a blackhole or
    // directly-connected route with no gateway next-hop is still
    // active and must still get its incoming label programmed.
    fn is_active(&self, prefix: Ipv4Network) -> bool;

    // The IPv4 next-hop of the currently active route for `prefix`, if
    // one exists and carries a gateway next-hop (spec.md §4.3
    // `select_lsp` step 1, a blackhole or directly-connected route
    // without a next-hop address yields `None` here, not a next-hop of
    // `0.0.0.0`).
    fn active_nexthop(&self, prefix: Ipv4Network) -> Option<Ipv4Addr>;

    // Asks the RIB to re-evaluate the forwarding entry for `prefix` so
    // that an FTN (IPv4-to-label) binding gets programmed (spec.md
    // §4.3 `select_lsp` step 8, `rib_queue_add` in the Quagga
    // ancestor). Fire-and-forget; this crate does not wait for or
    // observe the result.
    fn request_ftn_reeval(&self, prefix: Ipv4Network);
}
