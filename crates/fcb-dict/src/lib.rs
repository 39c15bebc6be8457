//! fcb-dict: the OpenFOAM dictionary file format.
//!
//! Parses and writes `FoamFile` dictionaries, merges patches into them with
//! change detection, and reads/writes `polyMesh/boundary` patch lists.

pub mod dictionary;
pub mod error;
pub mod header;
pub mod merge;
mod parse;
mod token;
pub mod value;
mod write;

use std::fs;
use std::path::{Path, PathBuf};

pub use dictionary::Dictionary;
pub use error::{DictError, DictResult};
pub use header::{DEFAULT_BANNER_VERSION, Header, VALID_LOCATIONS, validate_location};
pub use merge::{Change, ChangeKind, MergeReport};
pub use value::{Scalar, Value, format_uniform, uniform_scalar, uniform_vector};

use parse::Parser;

/// A named, located dictionary file: header plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct FoamDict {
    pub header: Header,
    pub body: Dictionary,
}

impl FoamDict {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            body: Dictionary::new(),
        }
    }

    /// Parse text that must carry a complete `FoamFile` header.
    pub fn parse(src: &str) -> DictResult<Self> {
        parse_document(src, None)
    }

    /// Parse text whose header may be missing or lack `object`; `name`
    /// fills in the object name.
    pub fn parse_named(src: &str, name: &str) -> DictResult<Self> {
        parse_document(src, Some(name))
    }

    /// Read a dictionary file.
    ///
    /// The file name is the fallback object name; a missing location is
    /// inferred from the parent directories when they form a known one.
    pub fn load(path: &Path) -> DictResult<Self> {
        let text = read_text(path)?;
        let name = file_name(path);
        let mut doc = Self::parse_named(&text, &name).map_err(|e| e.with_path(path))?;
        if doc.header.location.is_none() {
            doc.header.location = infer_location(path);
        }
        Ok(doc)
    }

    /// Write the dictionary to an explicit path, creating parent directories.
    pub fn save(&self, path: &Path) -> DictResult<()> {
        write_text(path, &self.to_foam_string())
    }

    /// Write to `<case_dir>/<location>/<object>`.
    pub fn save_in_case(&self, case_dir: &Path) -> DictResult<PathBuf> {
        let mut path = case_dir.to_path_buf();
        if let Some(location) = &self.header.location {
            path.push(location);
        }
        path.push(&self.header.object);
        self.save(&path)?;
        Ok(path)
    }

    pub fn to_foam_string(&self) -> String {
        let mut out = String::new();
        write::write_header(&mut out, &self.header);
        write::write_entries(&mut out, &self.body, 0);
        write::write_footer(&mut out);
        out
    }

    /// See [`Dictionary::update`].
    pub fn update(&mut self, patch: &Dictionary, replace: bool) -> MergeReport {
        let report = self.body.update(patch, replace);
        if report.changed() {
            tracing::debug!(
                object = %self.header.object,
                changes = report.changes.len(),
                "dictionary updated"
            );
        }
        report
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.body.get_path(path)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> DictResult<()> {
        self.body.set_path(path, value)
    }
}

impl Dictionary {
    /// Parse entries only. A leading `FoamFile` block is skipped.
    pub fn parse(src: &str) -> DictResult<Self> {
        let mut parser = Parser::new(src)?;
        parser.header_block()?;
        parser.entries(false)
    }
}

fn parse_document(src: &str, fallback: Option<&str>) -> DictResult<FoamDict> {
    let mut parser = Parser::new(src)?;
    let header = match parser.header_block()? {
        Some((block, offset)) => Header::from_block(&block, offset, fallback)?,
        None => match fallback {
            Some(name) => Header::new(name),
            None => return Err(DictError::format(0, "missing FoamFile header")),
        },
    };
    let body = parser.entries(false)?;
    Ok(FoamDict { header, body })
}

/// A `polyMesh/boundary` file: header plus ordered patch list.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFile {
    pub header: Header,
    pub patches: Vec<(String, Dictionary)>,
}

impl BoundaryFile {
    pub fn patch(&self, name: &str) -> Option<&Dictionary> {
        self.patches.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn patch_mut(&mut self, name: &str) -> Option<&mut Dictionary> {
        self.patches
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn patch_names(&self) -> impl Iterator<Item = &str> {
        self.patches.iter().map(|(n, _)| n.as_str())
    }

    pub fn parse(src: &str) -> DictResult<Self> {
        let mut parser = Parser::new(src)?;
        let header = match parser.header_block()? {
            Some((block, offset)) => Header::from_block(&block, offset, Some("boundary"))?,
            None => Header::new("boundary"),
        };
        let patches = parser.patch_list()?;
        if !parser.at_end() {
            return Err(DictError::format(
                src.len(),
                "unexpected content after patch list",
            ));
        }
        Ok(Self { header, patches })
    }

    pub fn to_foam_string(&self) -> String {
        let mut out = String::new();
        write::write_header(&mut out, &self.header);
        write::write_patch_list(&mut out, &self.patches);
        write::write_footer(&mut out);
        out
    }
}

/// Read `constant/polyMesh/boundary` (or any patch-list file).
pub fn read_boundary_file(path: &Path) -> DictResult<BoundaryFile> {
    let text = read_text(path)?;
    BoundaryFile::parse(&text).map_err(|e| e.with_path(path))
}

pub fn write_boundary_file(path: &Path, file: &BoundaryFile) -> DictResult<()> {
    write_text(path, &file.to_foam_string())
}

fn infer_location(path: &Path) -> Option<String> {
    let parent = path.parent()?;
    let dir = parent.file_name()?.to_string_lossy().into_owned();
    let grand = parent
        .parent()
        .and_then(|g| g.file_name())
        .map(|g| g.to_string_lossy().into_owned());
    if let Some(grand) = grand {
        let nested = format!("{grand}/{dir}");
        if VALID_LOCATIONS.contains(&nested.as_str()) {
            return Some(nested);
        }
    }
    VALID_LOCATIONS.contains(&dir.as_str()).then_some(dir)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_text(path: &Path) -> DictResult<String> {
    fs::read_to_string(path).map_err(|source| DictError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> DictResult<()> {
    let io_err = |source| DictError::Io {
        path: PathBuf::from(path),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, text).map_err(io_err)
}
