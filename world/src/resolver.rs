//! Field-wise combination of base content and overrides.

use token_grid_core::{CellContent, CellOverride};

/// Combines base content with an optional override, field by field.
///
/// Fields missing from the override inherit from `base`. The value collapses
/// to zero whenever the resolved cell has no token.
pub(crate) fn resolve(base: CellContent, overlay: Option<&CellOverride>) -> CellContent {
    let Some(overlay) = overlay else {
        return base;
    };
    CellContent::from_parts(
        overlay.has_token.unwrap_or(base.has_token()),
        overlay.value.unwrap_or(base.value()),
    )
}
