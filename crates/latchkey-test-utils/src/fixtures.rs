// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field descriptor builders and canned login forms.

use latchkey_core::{FieldDescriptor, FieldHandle};

/// An input with the given handle and `type` attribute.
pub fn input(handle: usize, input_type: &str) -> FieldDescriptor {
    FieldDescriptor {
        handle: FieldHandle(handle),
        input_type: Some(input_type.to_string()),
        visible: true,
        ..Default::default()
    }
}

/// An input with no `type` attribute at all.
pub fn untyped(handle: usize) -> FieldDescriptor {
    FieldDescriptor {
        handle: FieldHandle(handle),
        visible: true,
        ..Default::default()
    }
}

pub fn named(mut field: FieldDescriptor, name: &str) -> FieldDescriptor {
    field.name = Some(name.to_string());
    field
}

pub fn with_id(mut field: FieldDescriptor, id: &str) -> FieldDescriptor {
    field.id = Some(id.to_string());
    field
}

pub fn hidden(mut field: FieldDescriptor) -> FieldDescriptor {
    field.visible = false;
    field
}

pub fn disabled(mut field: FieldDescriptor) -> FieldDescriptor {
    field.disabled = true;
    field
}

/// A search box, an email field and a password field.
pub fn email_login_form() -> Vec<FieldDescriptor> {
    vec![
        named(input(0, "search"), "q"),
        named(input(1, "email"), "email"),
        named(input(2, "password"), "password"),
    ]
}

/// A text field followed by a password field.
pub fn username_login_form() -> Vec<FieldDescriptor> {
    vec![
        named(input(0, "text"), "username"),
        named(input(1, "password"), "password"),
    ]
}

/// A newsletter signup with no secret field.
pub fn newsletter_form() -> Vec<FieldDescriptor> {
    vec![named(input(0, "email"), "subscribe_email")]
}

/// The login form served by codechef.com.
pub fn codechef_login_form() -> Vec<FieldDescriptor> {
    vec![
        named(input(0, "search"), "search"),
        with_id(named(input(1, "text"), "name"), "edit-name"),
        with_id(named(input(2, "password"), "pass"), "edit-pass"),
        named(input(3, "submit"), "op"),
    ]
}
