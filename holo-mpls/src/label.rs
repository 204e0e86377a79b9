//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

// A 20-bit MPLS label.
//
// `NO_LABEL` in the Quagga `zebra` MPLS LIB this crate descends from is
// the sentinel value `UINT_MAX` stored directly in a `u32` field. Here
// "unset" is always spelled `Option<Label>` instead, so `Label` itself
// only ever holds a value inside the 20-bit domain.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Label(u32);

impl Label {
    pub const VALUE_MASK: u32 = 0x000F_FFFF;

    // Well-known MPLS labels (RFC 3032).
    pub const IPV4_EXPLICIT_NULL: u32 = 0;
    pub const ROUTER_ALERT: u32 = 1;
    pub const IPV6_EXPLICIT_NULL: u32 = 2;
    pub const IMPLICIT_NULL: u32 = 3;

    // MPLS label ranges.
    pub const RESERVED_RANGE: std::ops::RangeInclusive<u32> = 0..=15;
    pub const UNRESERVED_RANGE: std::ops::RangeInclusive<u32> = 16..=1_048_575;

    // Builds a label from a raw 20-bit value.
    //
    // Reserved values (1, 2, 4-15) are accepted without complaint, per
    // spec: they must be accepted from inputs without special handling,
    // they simply can't be *allocated* through the configuration
    // surface (that restriction belongs to the out-of-scope CLI front
    // end, not to this constructor).
    pub fn new(value: u32) -> Label {
        assert!(
            value <= *Self::UNRESERVED_RANGE.end(),
            "label value {value} outside the 20-bit MPLS label domain"
        );
        Label(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_reserved(self) -> bool {
        Self::RESERVED_RANGE.contains(&self.0)
    }

    pub fn is_implicit_null(self) -> bool {
        self.0 == Self::IMPLICIT_NULL
    }

    pub fn is_explicit_null(self) -> bool {
        self.0 == Self::IPV4_EXPLICIT_NULL
    }

    pub fn is_user_range(self) -> bool {
        !self.is_reserved()
    }

    // Parses the label token grammar used across the configuration
    // surface: the two named values, or any decimal that fits the
    // 20-bit domain. Range policy (user input must be >= 16) is
    // deliberately not enforced here; that belongs to the
    // configuration front end (spec.md §4.1, §6).
    pub fn parse(s: &str) -> Option<Label> {
        match s {
            "explicit-null" => Some(Label(Self::IPV4_EXPLICIT_NULL)),
            "implicit-null" => Some(Label(Self::IMPLICIT_NULL)),
            _ => {
                let value: u32 = s.parse().ok()?;
                (value <= *Self::UNRESERVED_RANGE.end()).then_some(Label(value))
            }
        }
    }

    // Long-form display, e.g. for the static configuration dump.
    pub fn to_long_string(self) -> String {
        match self.0 {
            Self::IPV4_EXPLICIT_NULL => "explicit-null".to_owned(),
            Self::IMPLICIT_NULL => "implicit-null".to_owned(),
            value => value.to_string(),
        }
    }

    // Short-form display, e.g. for the operator-facing forwarding view.
    pub fn to_short_string(self) -> String {
        match self.0 {
            Self::IPV4_EXPLICIT_NULL => "exp-null".to_owned(),
            Self::IMPLICIT_NULL => "imp-null".to_owned(),
            value => value.to_string(),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_long_string())
    }
}
