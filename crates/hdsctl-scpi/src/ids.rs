//! Identifier derivation from mnemonic paths.
//!
//! Two derived names are computed from every mnemonic path:
//!
//! - the camel-case id (`:HORizontal:SCALe` -> `horScal`) used by field-name
//!   consumers such as the live viewer
//! - the short form (`:HORizontal:SCALe` -> `:HOR:SCAL`), which is the
//!   abbreviated command the instrument accepts

/// Path delimiter between mnemonic segments.
pub const PATH_DELIMITER: char = ':';

/// Leading marker of common (IEEE 488.2) commands such as `*IDN`.
pub const COMMON_MARKER: char = '*';

/// Derive the camel-case field id of a mnemonic path.
///
/// Lowercase letters and separators are dropped. A letter that directly follows
/// a path delimiter starts a new segment and stays uppercase, except at the very
/// start of the path; every other retained letter is lowercased.
pub fn scpi_to_camel(mnemonic: &str) -> String {
    let chars: Vec<char> = mnemonic.chars().collect();
    let mut id = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if c.is_lowercase() || c == PATH_DELIMITER || c == COMMON_MARKER {
            continue;
        }
        if i > 1 && chars[i - 1] == PATH_DELIMITER {
            id.extend(c.to_uppercase());
        } else {
            id.extend(c.to_lowercase());
        }
    }
    id
}

/// Derive the abbreviated command form by keeping everything but lowercase letters.
pub fn scpi_to_short(mnemonic: &str) -> String {
    mnemonic.chars().filter(|c| !c.is_lowercase()).collect()
}
