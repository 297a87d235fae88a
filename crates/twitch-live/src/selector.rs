use crate::catalog::{StreamVariant, VariantCatalog};
use crate::error::{Error, Result};

/// Pick the first variant whose height equals `desired_height`, or the first
/// variant of the catalog when nothing matches.
///
/// The fallback relies on the platform listing the source rendition first.
/// Calling this on an empty catalog is a caller bug and returns
/// [`Error::EmptyCatalog`] immediately.
pub fn select_variant(
    catalog: &VariantCatalog,
    desired_height: Option<u32>,
) -> Result<&StreamVariant> {
    let first = catalog.first().ok_or(Error::EmptyCatalog)?;

    let Some(height) = desired_height else {
        return Ok(first);
    };

    Ok(catalog
        .iter()
        .find(|variant| variant.height() == height)
        .unwrap_or(first))
}
