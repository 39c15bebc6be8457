//! OpenFOAM version numbers and distribution variants.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RuntimeError;

/// A `(major, minor)` release number.
///
/// The development branch compares greater than every numbered release so
/// that feature gates like `version >= 4.0` hold for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FoamVersion {
    pub major: u32,
    pub minor: u32,
}

impl FoamVersion {
    pub const DEV: FoamVersion = FoamVersion {
        major: u32::MAX,
        minor: u32::MAX,
    };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn is_dev(&self) -> bool {
        *self == Self::DEV
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        *self >= Self::new(major, minor)
    }
}

impl Default for FoamVersion {
    fn default() -> Self {
        Self::new(5, 0)
    }
}

impl fmt::Display for FoamVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dev() {
            f.write_str("dev")
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

impl FromStr for FoamVersion {
    type Err = RuntimeError;

    /// Accepts `5.0`, `4.x` (non-numeric parts read as 0), `6`, `v1806`
    /// and `dev`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("dev") {
            return Ok(Self::DEV);
        }
        let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
        let mut parts = text.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| RuntimeError::InvalidVersion(s.to_string()))?;
        let minor = parts.next().map_or(0, |p| p.parse::<u32>().unwrap_or(0));
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for FoamVersion {
    type Error = RuntimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FoamVersion> for String {
    fn from(v: FoamVersion) -> Self {
        v.to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoamVariant {
    #[default]
    #[serde(rename = "OpenFOAM")]
    OpenFoam,
    #[serde(rename = "OpenFOAM+")]
    OpenFoamPlus,
    #[serde(rename = "foam-extend")]
    ForkExtend,
}

impl FoamVariant {
    /// Classifies an installation from its directory name and the raw
    /// version string it reports.
    pub fn detect(install_dir: Option<&Path>, version_text: Option<&str>) -> Self {
        let dir_name = install_dir
            .and_then(|d| d.file_name())
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if dir_name.contains("ext") {
            return Self::ForkExtend;
        }
        let plus_marker = |text: &str| {
            text.match_indices(['v', 'V']).any(|(i, _)| {
                let digits = &text.as_bytes()[i + 1..];
                digits.len() >= 4 && digits[..4].iter().all(u8::is_ascii_digit)
            })
        };
        if version_text.is_some_and(plus_marker) || plus_marker(&dir_name) {
            Self::OpenFoamPlus
        } else {
            Self::OpenFoam
        }
    }

    pub fn is_extend(&self) -> bool {
        matches!(self, Self::ForkExtend)
    }
}

impl fmt::Display for FoamVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenFoam => "OpenFOAM",
            Self::OpenFoamPlus => "OpenFOAM+",
            Self::ForkExtend => "foam-extend",
        })
    }
}
