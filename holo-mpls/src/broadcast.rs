//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::Ipv4Network;

use crate::label::Label;

// The client-broadcast bus (spec.md §6): fire-and-forget notification
// to the dynamic label-distribution protocol ("LDP" in the Quagga
// ancestor) whenever a static-label edit changes `selected_in_label`
// while the route is active. The engine never receives an
// acknowledgement and never retries a broadcast.
pub trait ClientBroadcast {
    fn local_binding_changed(&self, prefix: Ipv4Network, label: Option<Label>);
}

// A broadcaster that drops every notification. Useful for callers
// that don't run a dynamic label-distribution protocol (e.g. a
// purely-static deployment) or for tests that don't assert on
// broadcast traffic.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBroadcast;

impl ClientBroadcast for NullBroadcast {
    fn local_binding_changed(&self, _prefix: Ipv4Network, _label: Option<Label>) {}
}
