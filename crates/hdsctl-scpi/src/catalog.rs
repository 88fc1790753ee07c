//! The command catalog.
//!
//! A [`Catalog`] is built once from a declarative list of [`CommandSpec`]s and is
//! immutable afterwards. Specs whose path contains the channel placeholder are
//! expanded into one definition per channel index.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::error::{ScpiError, ScpiResult};
use crate::field::Field;
use crate::ids::{scpi_to_camel, scpi_to_short};

/// Placeholder substituted with the channel index during expansion.
pub const CHANNEL_PLACEHOLDER: &str = "<n>";

/// Trailing marker that turns a mnemonic into a query.
pub const QUERY_MARKER: char = '?';

/// Whether a parameter can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Query only.
    ReadOnly,
    /// Query and set.
    ReadWrite,
}

impl AccessMode {
    /// Get the mode as a short display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "ro",
            AccessMode::ReadWrite => "rw",
        }
    }
}

/// A declarative catalog entry, before placeholder expansion.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Mnemonic path, possibly containing [`CHANNEL_PLACEHOLDER`].
    pub path: &'static str,
    /// Access mode.
    pub mode: AccessMode,
    /// Legal literal values, or `None` for free-form values.
    pub domain: Option<&'static [&'static str]>,
    /// Human description, possibly containing [`CHANNEL_PLACEHOLDER`].
    pub comment: &'static str,
}

impl CommandSpec {
    /// Create a new spec.
    pub const fn new(
        path: &'static str,
        mode: AccessMode,
        domain: Option<&'static [&'static str]>,
        comment: &'static str,
    ) -> Self {
        CommandSpec {
            path,
            mode,
            domain,
            comment,
        }
    }
}

/// One addressable instrument parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    /// Full mnemonic path, e.g. `:CH1:DISPlay`.
    pub path: String,
    /// Abbreviated command, e.g. `:CH1:DISP`.
    pub short: String,
    /// Camel-case field id, e.g. `ch1Disp`.
    pub id: String,
    /// Access mode.
    pub mode: AccessMode,
    /// Advisory value domain; `None` means free-form.
    pub domain: Option<Vec<String>>,
    /// Human description.
    pub comment: String,
}

impl ParameterDefinition {
    fn from_spec(spec: &CommandSpec, channel: Option<u8>) -> Self {
        let substitute = |text: &str| match channel {
            Some(ch) => text.replace(CHANNEL_PLACEHOLDER, &ch.to_string()),
            None => text.to_string(),
        };
        let path = substitute(spec.path);
        ParameterDefinition {
            short: scpi_to_short(&path),
            id: scpi_to_camel(&path),
            mode: spec.mode,
            domain: spec
                .domain
                .map(|values| values.iter().map(|v| v.to_string()).collect()),
            comment: substitute(spec.comment),
            path,
        }
    }

    /// Whether sets are accepted.
    pub fn is_writable(&self) -> bool {
        self.mode == AccessMode::ReadWrite
    }
}

/// Expand a spec into one definition per channel index.
///
/// A spec without the placeholder yields exactly one definition.
pub fn expand(spec: &CommandSpec, channels: RangeInclusive<u8>) -> Vec<ParameterDefinition> {
    if !spec.path.contains(CHANNEL_PLACEHOLDER) {
        return vec![ParameterDefinition::from_spec(spec, None)];
    }
    channels
        .map(|ch| ParameterDefinition::from_spec(spec, Some(ch)))
        .collect()
}

/// Strip an optional trailing query marker.
pub fn strip_query_marker(name: &str) -> (&str, bool) {
    match name.strip_suffix(QUERY_MARKER) {
        Some(stripped) => (stripped, true),
        None => (name, false),
    }
}

/// The immutable set of all addressable parameter definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: Vec<Arc<ParameterDefinition>>,
    /// Camel-case id -> index.
    by_id: HashMap<String, usize>,
    /// Uppercased full path and short form -> index.
    by_path: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from a declarative spec list.
    ///
    /// Fails with [`ScpiError::DuplicateDefinition`] when two expanded
    /// definitions share an id, a short form or a path.
    pub fn build(specs: &[CommandSpec], channels: RangeInclusive<u8>) -> ScpiResult<Self> {
        let mut catalog = Catalog::default();
        for spec in specs {
            for definition in expand(spec, channels.clone()) {
                catalog.insert(definition)?;
            }
        }
        Ok(catalog)
    }

    fn insert(&mut self, definition: ParameterDefinition) -> ScpiResult<()> {
        let index = self.definitions.len();

        if let Some(&existing) = self.by_id.get(&definition.id) {
            return Err(self.duplicate(&definition.id, existing, &definition));
        }
        let path_keys = [definition.path.to_ascii_uppercase(), definition.short.clone()];
        for key in &path_keys {
            if let Some(&existing) = self.by_path.get(key) {
                return Err(self.duplicate(key, existing, &definition));
            }
        }

        self.by_id.insert(definition.id.clone(), index);
        for key in path_keys {
            self.by_path.insert(key, index);
        }
        self.definitions.push(Arc::new(definition));
        Ok(())
    }

    fn duplicate(&self, key: &str, existing: usize, second: &ParameterDefinition) -> ScpiError {
        ScpiError::DuplicateDefinition {
            key: key.to_string(),
            first: self.definitions[existing].path.clone(),
            second: second.path.clone(),
        }
    }

    /// Look up a definition by full path or short form, case-insensitively.
    /// A trailing query marker is ignored.
    pub fn lookup_by_path(&self, name: &str) -> Option<&Arc<ParameterDefinition>> {
        let (name, _) = strip_query_marker(name.trim());
        self.by_path
            .get(&name.to_ascii_uppercase())
            .map(|&index| &self.definitions[index])
    }

    /// Look up a definition by its camel-case id.
    pub fn lookup_by_id(&self, id: &str) -> Option<&Arc<ParameterDefinition>> {
        self.by_id.get(id).map(|&index| &self.definitions[index])
    }

    /// Resolve a typed field identifier.
    pub fn field(&self, field: Field) -> Option<&Arc<ParameterDefinition>> {
        self.lookup_by_id(field.id())
    }

    /// Iterate over all definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ParameterDefinition>> {
        self.definitions.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON_OFF: &[&str] = &["ON", "OFF"];

    #[test]
    fn test_expand_channel_placeholder() {
        let spec = CommandSpec::new(
            ":CH<n>:DISPlay",
            AccessMode::ReadWrite,
            Some(ON_OFF),
            "the display status of channel <n>",
        );
        let catalog = Catalog::build(&[spec], 1..=2).unwrap();

        assert_eq!(catalog.len(), 2);
        let paths: Vec<&str> = catalog.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec![":CH1:DISPlay", ":CH2:DISPlay"]);

        for (def, ch) in catalog.iter().zip(1..) {
            assert_eq!(def.domain, Some(vec!["ON".to_string(), "OFF".to_string()]));
            assert_eq!(def.id, format!("ch{}Disp", ch));
            assert_eq!(def.comment, format!("the display status of channel {}", ch));
            assert!(!def.path.contains(CHANNEL_PLACEHOLDER));
        }
    }

    #[test]
    fn test_expand_without_placeholder() {
        let spec = CommandSpec::new(":HORizontal:OFFSet", AccessMode::ReadWrite, None, "");
        let defs = expand(&spec, 1..=4);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].path, ":HORizontal:OFFSet");
        assert_eq!(defs[0].domain, None);
    }

    #[test]
    fn test_lookup_by_path_forms() {
        let spec = CommandSpec::new(":CH<n>:DISPlay", AccessMode::ReadWrite, Some(ON_OFF), "");
        let catalog = Catalog::build(&[spec], 1..=2).unwrap();

        let full = catalog.lookup_by_path(":CH1:DISPlay").unwrap();
        let short = catalog.lookup_by_path(":CH1:DISP").unwrap();
        let query = catalog.lookup_by_path(":CH1:DISP?").unwrap();
        let lower = catalog.lookup_by_path(":ch1:disp").unwrap();
        assert!(Arc::ptr_eq(full, short));
        assert!(Arc::ptr_eq(full, query));
        assert!(Arc::ptr_eq(full, lower));

        assert!(catalog.lookup_by_path(":CH3:DISP").is_none());
        assert!(catalog.lookup_by_id("ch2Disp").is_some());
        assert!(catalog.lookup_by_id(":CH2:DISP").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let specs = [
            CommandSpec::new(":MEASurement:CH<n>:MAX", AccessMode::ReadOnly, None, ""),
            CommandSpec::new(":MEASurement:CH<n>:MAX", AccessMode::ReadWrite, None, ""),
        ];
        let err = Catalog::build(&specs, 1..=2).unwrap_err();
        assert_eq!(
            err,
            ScpiError::DuplicateDefinition {
                key: "measCh1Max".to_string(),
                first: ":MEASurement:CH1:MAX".to_string(),
                second: ":MEASurement:CH1:MAX".to_string(),
            }
        );
    }
}
