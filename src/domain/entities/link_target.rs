//! Link target entity: an alternate destination selected by request attributes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request attribute a target rule matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Matches the visitor's device class (`mobile`, `tablet`, `desktop`).
    Device,
    /// Matches the visitor's ISO 3166-1 alpha-2 country code.
    Geo,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Geo => "geo",
        }
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "device" => Ok(Self::Device),
            "geo" | "country" => Ok(Self::Geo),
            other => Err(format!("unknown target type: {other}")),
        }
    }
}

/// Coarse device class derived from the User-Agent header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            other => Err(format!("unknown device class: {other}")),
        }
    }
}

/// A targeting rule attached to a link.
///
/// Lower `priority` numbers are evaluated first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub id: i64,
    pub link_id: i64,
    pub kind: TargetKind,
    pub value: String,
    pub destination_url: String,
    pub priority: i32,
    pub is_active: bool,
}

impl LinkTarget {
    /// Returns true if this rule matches the given device class and country.
    ///
    /// Device values that are not a known class never match. Geo rules never match
    /// when the country is unknown.
    pub fn matches(&self, device: DeviceClass, country: Option<&str>) -> bool {
        match self.kind {
            TargetKind::Device => self
                .value
                .parse::<DeviceClass>()
                .is_ok_and(|wanted| wanted == device),
            TargetKind::Geo => {
                country.is_some_and(|c| c.trim().eq_ignore_ascii_case(self.value.trim()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(kind: TargetKind, value: &str) -> LinkTarget {
        LinkTarget {
            id: 1,
            link_id: 1,
            kind,
            value: value.to_string(),
            destination_url: "https://m.example.com".to_string(),
            priority: 1,
            is_active: true,
        }
    }

    #[test]
    fn test_device_target_matches_class() {
        let t = target(TargetKind::Device, "Mobile");
        assert!(t.matches(DeviceClass::Mobile, None));
        assert!(!t.matches(DeviceClass::Desktop, None));
        assert!(!t.matches(DeviceClass::Tablet, Some("US")));
    }

    #[test]
    fn test_device_target_with_unknown_value_never_matches() {
        let t = target(TargetKind::Device, "smartwatch");
        assert!(!t.matches(DeviceClass::Mobile, None));
        assert!(!t.matches(DeviceClass::Desktop, None));
    }

    #[test]
    fn test_geo_target_is_case_insensitive() {
        let t = target(TargetKind::Geo, "de");
        assert!(t.matches(DeviceClass::Desktop, Some("DE")));
        assert!(!t.matches(DeviceClass::Desktop, Some("FR")));
        assert!(!t.matches(DeviceClass::Desktop, None));
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("device".parse::<TargetKind>().unwrap(), TargetKind::Device);
        assert_eq!("GEO".parse::<TargetKind>().unwrap(), TargetKind::Geo);
        assert!("language".parse::<TargetKind>().is_err());
        assert_eq!("tablet".parse::<DeviceClass>().unwrap(), DeviceClass::Tablet);
    }
}
