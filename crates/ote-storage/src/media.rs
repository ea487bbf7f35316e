//! Media type to driver resolution
//!
//! An explicit driver name always wins. Otherwise the media type is looked
//! up (case-insensitive, parameters after `;` ignored) in a fixed table.

use crate::error::ResolveError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static MEDIA_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("application/json", "json"),
        ("text/json", "json"),
        ("application/yaml", "yaml"),
        ("application/x-yaml", "yaml"),
        ("text/yaml", "yaml"),
        ("application/msgpack", "msgpack"),
        ("application/x-msgpack", "msgpack"),
        ("application/vnd.msgpack", "msgpack"),
    ])
});

/// Driver registered for a media type, if any
#[must_use]
pub fn driver_for_media_type(media_type: &str) -> Option<&'static str> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    MEDIA_TYPES.get(essence.as_str()).copied()
}

/// Resolve the driver name from configuration
///
/// Blank strings count as absent.
///
/// # Errors
/// - [`ResolveError::Unspecified`] if neither input is given
/// - [`ResolveError::UnsupportedMediaType`] if the media type is unknown
pub fn resolve_driver(driver: Option<&str>, media_type: Option<&str>) -> Result<String, ResolveError> {
    if let Some(name) = driver.filter(|d| !d.trim().is_empty()) {
        return Ok(name.to_string());
    }
    let media_type = media_type
        .filter(|m| !m.trim().is_empty())
        .ok_or(ResolveError::Unspecified)?;
    driver_for_media_type(media_type)
        .map(str::to_string)
        .ok_or_else(|| ResolveError::UnsupportedMediaType(media_type.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_driver_wins() {
        assert_eq!(resolve_driver(Some("yaml"), Some("application/json")).unwrap(), "yaml");
        // Unknown names pass through; the registry rejects them later
        assert_eq!(resolve_driver(Some("hdf5"), None).unwrap(), "hdf5");
    }

    #[test]
    fn media_type_lookup() {
        assert_eq!(resolve_driver(None, Some("application/json")).unwrap(), "json");
        assert_eq!(resolve_driver(None, Some("Application/JSON; charset=utf-8")).unwrap(), "json");
        assert_eq!(resolve_driver(Some(""), Some("text/yaml")).unwrap(), "yaml");
        assert_eq!(resolve_driver(None, Some("application/vnd.msgpack")).unwrap(), "msgpack");
    }

    #[test]
    fn neither_given() {
        assert_eq!(resolve_driver(None, None), Err(ResolveError::Unspecified));
        assert_eq!(resolve_driver(Some(" "), Some("")), Err(ResolveError::Unspecified));
    }

    #[test]
    fn unknown_media_type() {
        assert_eq!(
            resolve_driver(None, Some("image/png")),
            Err(ResolveError::UnsupportedMediaType("image/png".to_string()))
        );
    }
}
