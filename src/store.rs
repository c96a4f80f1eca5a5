//! Host configuration store interface and an in-memory implementation.
//!
//! The matcher and the section copy only ever talk to a [`ConfigStore`]:
//! named sections holding typed parameters, plus a lookup for shared data
//! files such as the profile database.
//!
//! [`MemoryStore`] keeps sections and parameters in insertion order and
//! compares parameter keys ASCII case-insensitively, the way emulator
//! configuration files treat them.

use std::fmt;
use std::path::{Path, PathBuf};

use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Errors reported by a [`ConfigStore`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Config section '{0}' not found")]
    SectionNotFound(String),

    #[error("Parameter '{key}' not found in section '{section}'")]
    ParameterNotFound { section: String, key: String },

    #[error("Parameter '{key}' in section '{section}' is {found}, not {expected}")]
    TypeMismatch {
        section: String,
        key: String,
        expected: ParamType,
        found: ParamType,
    },

    #[error("Store rejected write of '{key}' to section '{section}'")]
    WriteRejected { section: String, key: String },

    #[error("Could not list parameters of section '{0}'")]
    ListFailed(String),
}

/// Declared type of a stored parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ParamType {
    Int,
    Bool,
    Float,
    String,
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Bool(bool),
    Float(f32),
    Str(String),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Str(_) => ParamType::String,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(true) => f.write_str("True"),
            ParamValue::Bool(false) => f.write_str("False"),
            ParamValue::Float(v) => write!(f, "{v:.6}"),
            ParamValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Opaque reference to an opened section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHandle(String);

impl SectionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The narrow slice of a host configuration API the auto-configuration
/// code needs.
pub trait ConfigStore {
    /// Open a section, creating it if it does not exist yet.
    fn open_section(&mut self, name: &str) -> Result<SectionHandle, StoreError>;

    fn set_parameter(
        &mut self,
        section: &SectionHandle,
        key: &str,
        value: &ParamValue,
    ) -> Result<(), StoreError>;

    /// Read a parameter as the requested type.
    fn get_parameter(
        &self,
        section: &SectionHandle,
        key: &str,
        ty: ParamType,
    ) -> Result<ParamValue, StoreError>;

    /// Visit every parameter of a section in storage order.
    fn list_parameters(
        &self,
        section: &SectionHandle,
        visitor: &mut dyn FnMut(&str, ParamType),
    ) -> Result<(), StoreError>;

    /// Resolve a shared data file (e.g. the profile database) to a path.
    fn shared_data_file_path(&self, file_name: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Default)]
struct Section {
    name: String,
    params: Vec<(String, ParamValue)>,
}

impl Section {
    fn find(&self, key: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sections: Vec<Section>,
    data_dirs: Vec<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that resolves shared data files in `dirs`, first hit wins.
    pub fn with_data_dirs(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            sections: Vec::new(),
            data_dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_data_dir(&mut self, dir: impl AsRef<Path>) {
        self.data_dirs.push(dir.as_ref().to_path_buf());
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Names of all sections, in creation order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a value without going through a handle.
    pub fn value(&self, section: &str, key: &str) -> Option<&ParamValue> {
        self.section(section)?.find(key)
    }

    /// All `(key, value)` pairs of a section, in storage order.
    pub fn entries(&self, section: &str) -> Vec<(&str, &ParamValue)> {
        self.section(section)
            .map(|s| s.params.iter().map(|(k, v)| (k.as_str(), v)).collect())
            .unwrap_or_default()
    }

    /// Render every section as `[Section]` followed by `key = value` lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section.name));
            for (key, value) in &section.params {
                out.push_str(&format!("{key} = {value}\n"));
            }
        }
        out
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }
}

impl ConfigStore for MemoryStore {
    fn open_section(&mut self, name: &str) -> Result<SectionHandle, StoreError> {
        if !self.has_section(name) {
            self.sections.push(Section {
                name: name.to_string(),
                params: Vec::new(),
            });
        }
        Ok(SectionHandle::new(name))
    }

    fn set_parameter(
        &mut self,
        section: &SectionHandle,
        key: &str,
        value: &ParamValue,
    ) -> Result<(), StoreError> {
        let target = self
            .section_mut(section.name())
            .ok_or_else(|| StoreError::SectionNotFound(section.name().to_string()))?;
        match target
            .params
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, existing)) => *existing = value.clone(),
            None => target.params.push((key.to_string(), value.clone())),
        }
        Ok(())
    }

    fn get_parameter(
        &self,
        section: &SectionHandle,
        key: &str,
        ty: ParamType,
    ) -> Result<ParamValue, StoreError> {
        let source = self
            .section(section.name())
            .ok_or_else(|| StoreError::SectionNotFound(section.name().to_string()))?;
        let value = source
            .find(key)
            .ok_or_else(|| StoreError::ParameterNotFound {
                section: section.name().to_string(),
                key: key.to_string(),
            })?;
        if value.param_type() != ty {
            return Err(StoreError::TypeMismatch {
                section: section.name().to_string(),
                key: key.to_string(),
                expected: ty,
                found: value.param_type(),
            });
        }
        Ok(value.clone())
    }

    fn list_parameters(
        &self,
        section: &SectionHandle,
        visitor: &mut dyn FnMut(&str, ParamType),
    ) -> Result<(), StoreError> {
        let source = self
            .section(section.name())
            .ok_or_else(|| StoreError::SectionNotFound(section.name().to_string()))?;
        for (key, value) in &source.params {
            visitor(key, value.param_type());
        }
        Ok(())
    }

    fn shared_data_file_path(&self, file_name: &str) -> Option<PathBuf> {
        self.data_dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }
}
