//! Field Extractor: locate a logical field in an arbitrarily-headed row.

use crate::row::{CellValue, RawRow};

/// Returns the first non-blank value whose header matches one of `aliases`.
///
/// Aliases are tried in priority order against exact header text first; only
/// if none match is the search repeated case-insensitively. The column order
/// of the sheet never affects which alias wins. Absence is normal and yields
/// `None`; coercers supply the caller's default.
#[must_use]
pub fn extract<'r>(row: &'r RawRow, aliases: &[String]) -> Option<&'r CellValue> {
    aliases
        .iter()
        .find_map(|alias| row.get(alias).filter(|v| !v.is_blank()))
        .or_else(|| {
            aliases.iter().find_map(|alias| {
                let wanted = alias.trim().to_lowercase();
                row.iter()
                    .find(|(header, value)| {
                        !value.is_blank() && header.trim().to_lowercase() == wanted
                    })
                    .map(|(_, value)| value)
            })
        })
}
