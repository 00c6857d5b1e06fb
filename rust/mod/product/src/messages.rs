//! User-facing error messages, keyed by message id.
//!
//! Templates use `{name}` placeholders filled at render time. The keys are
//! stable and double as the `reason` clients receive with an error.

use crate::model::CodeType;

pub const WRONG_CODE_LENGTH_EAN: &str = "wrong_code_length_ean";
pub const WRONG_CODE_LENGTH_UPC: &str = "wrong_code_length_upc";
pub const CODE_UNIQUE: &str = "code_unique";

static MESSAGES: &[(&str, &str)] = &[
    (WRONG_CODE_LENGTH_EAN, "Wrong code length:\nFor EAN, length should be 13."),
    (WRONG_CODE_LENGTH_UPC, "Wrong code length:\nFor UPC-A, length should be 12."),
    (
        CODE_UNIQUE,
        "Duplicate code:\nThe code \"{code}\" with type \"{code_type}\" already exists.",
    ),
];

/// Template registered under `key`.
pub fn template(key: &str) -> Option<&'static str> {
    MESSAGES.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
}

/// Render the message `key` with `params`. Unknown keys render as the key.
pub fn render(key: &str, params: &[(&str, &str)]) -> String {
    let Some(template) = template(key) else {
        return key.to_string();
    };
    params.iter().fold(template.to_string(), |msg, (name, value)| {
        msg.replace(&format!("{{{}}}", name), value)
    })
}

/// Message key for a length violation on `code_type`. Types without a
/// required length have none.
pub fn length_key(code_type: &CodeType) -> Option<&'static str> {
    match code_type {
        CodeType::Ean => Some(WRONG_CODE_LENGTH_EAN),
        CodeType::UpcA => Some(WRONG_CODE_LENGTH_UPC),
        CodeType::Other => None,
    }
}

pub(crate) fn wrong_code_length(code_type: &CodeType) -> String {
    match length_key(code_type) {
        Some(key) => render(key, &[]),
        None => format!("Wrong code length for {}.", code_type.label()),
    }
}

pub(crate) fn duplicate_code(code: &str, code_type: &CodeType) -> String {
    render(CODE_UNIQUE, &[("code", code), ("code_type", code_type.as_str())])
}
