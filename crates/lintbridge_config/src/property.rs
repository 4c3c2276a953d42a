//! `${name}` placeholder substitution.

use std::collections::BTreeMap;

use crate::ConfigError;

/// Looks up values for `${name}` references in rule configurations.
pub trait PropertyResolver {
    /// Returns the bound value, or `None` if `name` is unbound.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolves every reference to the empty string.
///
/// Used when the caller opts out of variable substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoringResolver;

impl PropertyResolver for IgnoringResolver {
    fn resolve(&self, _name: &str) -> Option<String> {
        Some(String::new())
    }
}

/// Resolves references from a fixed map.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: BTreeMap<String, String>,
}

impl MapResolver {
    /// Creates a resolver over the given bindings.
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl PropertyResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Result of substituting one property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Substituted {
    pub(crate) value: String,
    pub(crate) fully_resolved: bool,
}

/// Replaces `${name}` references in `value`.
///
/// Unbound references are kept verbatim. `$$` is an escaped `$`.
pub(crate) fn substitute(
    value: &str,
    resolver: &dyn PropertyResolver,
) -> Result<Substituted, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut fully_resolved = true;
    let mut rest = value;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("$$") {
            out.push('$');
            rest = after;
        } else if let Some(reference) = tail.strip_prefix("${") {
            let end = reference.find('}').ok_or_else(|| {
                ConfigError::property(format!("unterminated reference in \"{}\"", value))
            })?;
            let name = &reference[..end];
            match resolver.resolve(name) {
                Some(bound) => out.push_str(&bound),
                None => {
                    fully_resolved = false;
                    out.push_str(&tail[..end + 3]);
                }
            }
            rest = &reference[end + 1..];
        } else {
            out.push('$');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);

    Ok(Substituted {
        value: out,
        fully_resolved,
    })
}
