// src/domain/mention.rs

use std::collections::BTreeMap;

/// Telegram handle (without `@`) -> the name that person uses in the booking table.
pub type AliasMap = BTreeMap<String, String>;

pub const DEFAULT_UNASSIGNED_PREFIX: &str = "Ingen";
pub const DEFAULT_UNKNOWN_GLYPH: &str = "❓";

/// Turns a raw responsible name into what the chat should see.
///
/// The alias map stores handle -> name. A known name is rendered as `@handle`
/// so Telegram notifies that person; unknown names pass through untouched.
#[derive(Debug, Clone)]
pub struct MentionResolver {
    unassigned_prefix: String,
    unknown_glyph: String,
}

impl Default for MentionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_UNASSIGNED_PREFIX, DEFAULT_UNKNOWN_GLYPH)
    }
}

impl MentionResolver {
    pub fn new(unassigned_prefix: impl Into<String>, unknown_glyph: impl Into<String>) -> Self {
        Self {
            unassigned_prefix: unassigned_prefix.into(),
            unknown_glyph: unknown_glyph.into(),
        }
    }

    pub fn is_unassigned(&self, raw: &str) -> bool {
        raw.trim().starts_with(self.unassigned_prefix.as_str())
    }

    pub fn resolve(&self, raw: &str, aliases: &AliasMap) -> String {
        if self.is_unassigned(raw) {
            return self.unknown_glyph.clone();
        }

        let name = raw.trim();
        // BTreeMap iteration is ordered, so two handles claiming the same
        // name always resolve to the alphabetically first one.
        aliases
            .iter()
            .find(|(_, alias)| alias.trim() == name)
            .map(|(handle, _)| format!("@{handle}"))
            .unwrap_or_else(|| raw.to_string())
    }
}
