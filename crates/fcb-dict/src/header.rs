//! `FoamFile` header block.

use crate::dictionary::Dictionary;
use crate::error::{DictError, DictResult};
use crate::value::{Scalar, Value};

/// Fixed directories a dictionary may live in, relative to the case root.
pub const VALID_LOCATIONS: &[&str] = &["0", "system", "constant", "constant/polyMesh", "0.orig"];

/// Application version printed in the banner when none is supplied.
pub const DEFAULT_BANNER_VERSION: (u32, u32) = (5, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// File format version; always `2.0` for files this crate writes.
    pub version: String,
    pub format: String,
    pub class: String,
    pub location: Option<String>,
    pub object: String,
    /// Solver version shown in the banner comment. Not part of the data.
    pub banner_version: (u32, u32),
}

impl Header {
    /// Header with the usual defaults: `dictionary` class, ascii format.
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            version: "2.0".to_string(),
            format: "ascii".to_string(),
            class: "dictionary".to_string(),
            location: None,
            object: object.into(),
            banner_version: DEFAULT_BANNER_VERSION,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_location(mut self, location: &str) -> DictResult<Self> {
        validate_location(location)?;
        self.location = Some(location.to_string());
        Ok(self)
    }

    pub fn with_banner_version(mut self, version: (u32, u32)) -> Self {
        self.banner_version = version;
        self
    }

    /// Build from a parsed `FoamFile` block.
    ///
    /// `fallback_object` stands in for a missing `object` entry; without it
    /// the entry is required.
    pub(crate) fn from_block(
        block: &Dictionary,
        offset: usize,
        fallback_object: Option<&str>,
    ) -> DictResult<Self> {
        let text = |key: &str| block.get(key).map(value_text);

        let object = match (text("object"), fallback_object) {
            (Some(o), _) => o,
            (None, Some(f)) => f.to_string(),
            (None, None) => {
                return Err(DictError::format(
                    offset,
                    "FoamFile header is missing 'object'",
                ));
            }
        };

        let mut header = Header::new(object);
        for field in ["version", "format", "class"] {
            if !block.contains_key(field) {
                tracing::warn!(field, object = %header.object, "header field missing, using default");
            }
        }
        match block.get("version") {
            Some(Value::Scalar(Scalar::Number(v))) => header.version = format!("{v:.1}"),
            Some(other) => header.version = value_text(other),
            None => {}
        }
        if let Some(f) = text("format") {
            header.format = f;
        }
        if let Some(c) = text("class") {
            header.class = c;
        }
        if let Some(l) = text("location") {
            if validate_location(&l).is_err() {
                return Err(DictError::format(
                    offset,
                    format!("invalid header location '{l}'"),
                ));
            }
            header.location = Some(l);
        }
        Ok(header)
    }
}

fn value_text(v: &Value) -> String {
    match v.as_word() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    }
}

/// Accepts the fixed case directories and numeric time directories.
pub fn validate_location(location: &str) -> DictResult<()> {
    if VALID_LOCATIONS.contains(&location) || location.parse::<f64>().is_ok_and(f64::is_finite) {
        Ok(())
    } else {
        Err(DictError::InvalidLocation {
            location: location.to_string(),
        })
    }
}
