//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use holo_mpls::Label;

#[test]
fn parses_named_values() {
    assert_eq!(Label::parse("explicit-null"), Some(Label::new(0)));
    assert_eq!(Label::parse("implicit-null"), Some(Label::new(3)));
}

#[test]
fn parses_decimal_including_reserved() {
    assert_eq!(Label::parse("0"), Some(Label::new(0)));
    assert_eq!(Label::parse("15"), Some(Label::new(15)));
    assert_eq!(Label::parse("16"), Some(Label::new(16)));
    assert_eq!(Label::parse("1048575"), Some(Label::new(1_048_575)));
}

#[test]
fn rejects_out_of_domain_and_garbage() {
    assert_eq!(Label::parse("1048576"), None);
    assert_eq!(Label::parse("not-a-label"), None);
    assert_eq!(Label::parse(""), None);
    assert_eq!(Label::parse("-1"), None);
}

#[test]
fn classifies_reserved_and_user_range() {
    assert!(Label::new(0).is_reserved());
    assert!(Label::new(15).is_reserved());
    assert!(!Label::new(16).is_reserved());
    assert!(Label::new(16).is_user_range());
    assert!(!Label::new(0).is_user_range());
}

#[test]
fn classifies_null_labels() {
    assert!(Label::new(0).is_explicit_null());
    assert!(!Label::new(3).is_explicit_null());
    assert!(Label::new(3).is_implicit_null());
    assert!(!Label::new(0).is_implicit_null());
    assert!(!Label::new(100).is_implicit_null());
}

#[test]
fn display_uses_named_forms() {
    assert_eq!(Label::new(0).to_string(), "explicit-null");
    assert_eq!(Label::new(3).to_string(), "implicit-null");
    assert_eq!(Label::new(100).to_string(), "100");
    assert_eq!(Label::new(3).to_short_string(), "imp-null");
}
