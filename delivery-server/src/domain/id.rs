//! Location and route identifier types.

use std::fmt;

/// Error returned when an identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

fn normalize(kind: &'static str, s: &str) -> Result<String, InvalidId> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(InvalidId {
            kind,
            reason: "cannot be empty",
        });
    }
    Ok(trimmed.to_string())
}

/// Identifier of a delivery hub.
///
/// The upstream API types ids as integers in some payloads and strings in
/// others. Both collapse into this one opaque string type at the transport
/// boundary, so `42` and `"42"` name the same location.
///
/// # Examples
///
/// ```
/// use delivery_server::domain::LocationId;
///
/// let id = LocationId::new(" l1 ").unwrap();
/// assert_eq!(id.as_str(), "l1");
/// assert_eq!(LocationId::from_number(42).as_str(), "42");
///
/// assert!(LocationId::new("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(String);

impl LocationId {
    /// Create an id from a string. Surrounding whitespace is trimmed.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidId> {
        normalize("location", s.as_ref()).map(LocationId)
    }

    /// Create an id from a numeric wire id.
    pub fn from_number(n: i64) -> Self {
        LocationId(n.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationId({})", self.0)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a delivery route.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(String);

impl RouteId {
    /// Create an id from a string. Surrounding whitespace is trimmed.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidId> {
        normalize("route", s.as_ref()).map(RouteId)
    }

    /// Create an id from a numeric wire id.
    pub fn from_number(n: i64) -> Self {
        RouteId(n.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        assert_eq!(LocationId::new("  l1\n").unwrap().as_str(), "l1");
        assert_eq!(RouteId::new("\tr2 ").unwrap().as_str(), "r2");
    }

    #[test]
    fn rejects_empty() {
        assert!(LocationId::new("").is_err());
        assert!(LocationId::new("  ").is_err());
        assert!(RouteId::new("").is_err());
    }

    #[test]
    fn numeric_and_string_forms_agree() {
        assert_eq!(LocationId::from_number(7), LocationId::new("7").unwrap());
        assert_eq!(RouteId::from_number(101), RouteId::new("101").unwrap());
    }

    #[test]
    fn error_display() {
        let err = RouteId::new("").unwrap_err();
        assert_eq!(err.to_string(), "invalid route id: cannot be empty");
    }

    #[test]
    fn debug_and_display() {
        let id = LocationId::new("l3").unwrap();
        assert_eq!(format!("{id}"), "l3");
        assert_eq!(format!("{id:?}"), "LocationId(l3)");
    }
}
