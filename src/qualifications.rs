//! Typed access to the well-known assembly qualifications.
//!
//! The AST stores every qualification as a plain `Name=Value` string pair.
//! This module reads the five names the runtime itself understands and writes
//! them back in the runtime's own notation. Unknown names are untouched.

use crate::ast::{Assembly, Qualification};
use crate::error::{ParseArchitectureError, ParseVersionError, QualificationError};
use log::debug;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod names {
    pub const VERSION: &str = "Version";
    pub const PUBLIC_KEY: &str = "PublicKey";
    pub const PUBLIC_KEY_TOKEN: &str = "PublicKeyToken";
    pub const CULTURE: &str = "Culture";
    pub const PROCESSOR_ARCHITECTURE: &str = "ProcessorArchitecture";
}

const NULL_BLOB: &str = "null";

/// The runtime stores version components as signed 32-bit integers.
pub const MAX_VERSION_COMPONENT: u32 = i32::MAX as u32;

// === Version ===

/// `major.minor[.build[.revision]]`, each component in `0..=i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
    build: Option<u32>,
    revision: Option<u32>,
}

/// # Panics
///
/// The constructors panic when a component exceeds [`MAX_VERSION_COMPONENT`].
impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major: component(major),
            minor: component(minor),
            build: None,
            revision: None,
        }
    }

    pub const fn with_build(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major: component(major),
            minor: component(minor),
            build: Some(component(build)),
            revision: None,
        }
    }

    pub const fn with_revision(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major: component(major),
            minor: component(minor),
            build: Some(component(build)),
            revision: Some(component(revision)),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn build(&self) -> Option<u32> {
        self.build
    }

    pub fn revision(&self) -> Option<u32> {
        self.revision
    }
}

const fn component(value: u32) -> u32 {
    assert!(
        value <= MAX_VERSION_COMPONENT,
        "version component exceeds i32::MAX"
    );
    value
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseVersionError(s.to_string());
        let component = |part: &str| -> Result<u32, ParseVersionError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(error());
            }
            part.parse::<u32>()
                .ok()
                .filter(|&value| value <= MAX_VERSION_COMPONENT)
                .ok_or_else(error)
        };

        let parts: Vec<&str> = s.split('.').collect();

        match parts.as_slice() {
            [major, minor] => Ok(Version::new(component(major)?, component(minor)?)),
            [major, minor, build] => Ok(Version::with_build(
                component(major)?,
                component(minor)?,
                component(build)?,
            )),
            [major, minor, build, revision] => Ok(Version::with_revision(
                component(major)?,
                component(minor)?,
                component(build)?,
                component(revision)?,
            )),
            _ => Err(error()),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;

        if let Some(build) = self.build {
            write!(f, ".{build}")?;

            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }

        Ok(())
    }
}

// === ProcessorArchitecture ===

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorArchitecture {
    None = 0,
    MSIL = 1,
    X86 = 2,
    IA64 = 3,
    Amd64 = 4,
    Arm = 5,
}

impl ProcessorArchitecture {
    pub const ALL: [ProcessorArchitecture; 6] = [
        ProcessorArchitecture::None,
        ProcessorArchitecture::MSIL,
        ProcessorArchitecture::X86,
        ProcessorArchitecture::IA64,
        ProcessorArchitecture::Amd64,
        ProcessorArchitecture::Arm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessorArchitecture::None => "None",
            ProcessorArchitecture::MSIL => "MSIL",
            ProcessorArchitecture::X86 => "X86",
            ProcessorArchitecture::IA64 => "IA64",
            ProcessorArchitecture::Amd64 => "Amd64",
            ProcessorArchitecture::Arm => "Arm",
        }
    }
}

impl FromStr for ProcessorArchitecture {
    type Err = ParseArchitectureError;

    /// Accepts the exact (case-sensitive) name or the numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s || s.parse::<u8>().ok() == Some(*arch as u8))
            .ok_or_else(|| ParseArchitectureError(s.to_string()))
    }
}

impl fmt::Display for ProcessorArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === Blob ===

/// The value of a `PublicKey` or `PublicKeyToken` qualification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Blob {
    /// Written as the literal `null`: the assembly is explicitly unsigned.
    Null,
    Bytes(Vec<u8>),
}

impl Blob {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Blob::Null => None,
            Blob::Bytes(bytes) => Some(bytes),
        }
    }

    fn parse(value: &str) -> Option<Blob> {
        if value.is_empty() {
            return Some(Blob::Bytes(Vec::new()));
        }

        if value == NULL_BLOB {
            return Some(Blob::Null);
        }

        if value.len() % 2 == 1 {
            return None;
        }

        hex::decode(value).ok().map(Blob::Bytes)
    }

    fn encode(bytes: Option<&[u8]>) -> String {
        match bytes {
            Some(bytes) => hex::encode_upper(bytes),
            None => NULL_BLOB.to_string(),
        }
    }
}

// === Readers ===

impl Assembly {
    pub fn version(&self) -> Result<Option<Version>, QualificationError> {
        self.read(
            names::VERSION,
            |value| value.parse().ok(),
            |name, value| QualificationError::UnrecognisedFormat { name, value },
        )
    }

    pub fn public_key(&self) -> Result<Option<Blob>, QualificationError> {
        self.read(names::PUBLIC_KEY, Blob::parse, |name, value| {
            QualificationError::UnrecognisedFormat { name, value }
        })
    }

    pub fn public_key_token(&self) -> Result<Option<Blob>, QualificationError> {
        self.read(names::PUBLIC_KEY_TOKEN, Blob::parse, |name, value| {
            QualificationError::UnrecognisedFormat { name, value }
        })
    }

    pub fn processor_architecture(
        &self,
    ) -> Result<Option<ProcessorArchitecture>, QualificationError> {
        self.read(
            names::PROCESSOR_ARCHITECTURE,
            |value| value.parse().ok(),
            |name, value| QualificationError::Unrecognised { name, value },
        )
    }

    pub fn culture(&self) -> Option<&str> {
        self.qualification(names::CULTURE)
    }

    /// `Ok(None)` when the qualification is absent, an error when present
    /// but unreadable.
    fn read<T>(
        &self,
        name: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
        reject: impl FnOnce(&'static str, String) -> QualificationError,
    ) -> Result<Option<T>, QualificationError> {
        let Some(value) = self.qualification(name) else {
            return Ok(None);
        };

        match parse(value) {
            Some(parsed) => Ok(Some(parsed)),
            None => {
                debug!(
                    "assembly {} has an unreadable {name} qualification: {value:?}",
                    self.name
                );
                Err(reject(name, value.to_string()))
            }
        }
    }
}

// === Editors ===

/// Each editor hands back the same `Arc` when the assembly would not change.
impl Assembly {
    pub fn with_version(self: &Arc<Self>, version: Version) -> Arc<Assembly> {
        self.with_qualification(names::VERSION, version.to_string())
    }

    /// `None` writes the literal `null`.
    pub fn with_public_key(self: &Arc<Self>, public_key: Option<&[u8]>) -> Arc<Assembly> {
        self.with_qualification(names::PUBLIC_KEY, Blob::encode(public_key))
    }

    /// `None` writes the literal `null`.
    pub fn with_public_key_token(
        self: &Arc<Self>,
        public_key_token: Option<&[u8]>,
    ) -> Arc<Assembly> {
        self.with_qualification(names::PUBLIC_KEY_TOKEN, Blob::encode(public_key_token))
    }

    pub fn with_processor_architecture(
        self: &Arc<Self>,
        processor_architecture: ProcessorArchitecture,
    ) -> Arc<Assembly> {
        self.with_qualification(names::PROCESSOR_ARCHITECTURE, processor_architecture.as_str())
    }

    pub fn with_culture(self: &Arc<Self>, culture: impl Into<String>) -> Arc<Assembly> {
        self.with_qualification(names::CULTURE, culture)
    }

    /// Replaces the value of the first qualification called `name` in place,
    /// or appends a new one.
    pub fn with_qualification(
        self: &Arc<Self>,
        name: &str,
        value: impl Into<String>,
    ) -> Arc<Assembly> {
        let value = value.into();
        let existing = self.qualifications.iter().position(|q| q.name == name);

        if existing.is_some_and(|index| self.qualifications[index].value == value) {
            return Arc::clone(self);
        }

        let mut qualifications = self.qualifications.clone();
        let qualification = Arc::new(Qualification::new(name, value));

        match existing {
            Some(index) => qualifications[index] = qualification,
            None => qualifications.push(qualification),
        }

        Arc::new(Assembly::new(self.name.clone(), qualifications))
    }

    /// Removes the first qualification called `name`.
    pub fn without_qualification(self: &Arc<Self>, name: &str) -> Arc<Assembly> {
        let Some(index) = self.qualifications.iter().position(|q| q.name == name) else {
            return Arc::clone(self);
        };

        let mut qualifications = self.qualifications.clone();
        qualifications.remove(index);
        Arc::new(Assembly::new(self.name.clone(), qualifications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Arc<Assembly> {
        crate::factory::parse_assembly_name(text).unwrap()
    }

    #[test]
    fn test_version_components() {
        assert_eq!("4.2".parse::<Version>().unwrap(), Version::new(4, 2));
        assert_eq!("4.2.0.1".parse::<Version>().unwrap().to_string(), "4.2.0.1");
        assert_eq!("1.2.3".parse::<Version>().unwrap().revision(), None);
    }

    #[test]
    fn test_version_rejects_malformed() {
        for text in ["", "1", "1.2.3.4.5", "1..2", "a.b", "-1.0", "+1.0", "1.2147483648"] {
            assert!(text.parse::<Version>().is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn test_largest_version_component_survives_assembly() {
        let version = Version::new(MAX_VERSION_COMPONENT, 0);
        let assembly = parse("Foo").with_version(version);
        assert_eq!(assembly.version().unwrap(), Some(version));
    }

    #[test]
    #[should_panic(expected = "version component exceeds i32::MAX")]
    fn test_version_component_above_limit_panics() {
        let _ = Version::new(3_000_000_000, 0);
    }

    #[test]
    fn test_architecture_by_name_or_number() {
        assert_eq!("Amd64".parse::<ProcessorArchitecture>(), Ok(ProcessorArchitecture::Amd64));
        assert_eq!("1".parse::<ProcessorArchitecture>(), Ok(ProcessorArchitecture::MSIL));
        assert!("amd64".parse::<ProcessorArchitecture>().is_err());
        assert!("6".parse::<ProcessorArchitecture>().is_err());
    }

    #[test]
    fn test_blob_forms() {
        assert_eq!(Blob::parse(""), Some(Blob::Bytes(vec![])));
        assert_eq!(Blob::parse("null"), Some(Blob::Null));
        assert_eq!(Blob::parse("0aFF"), Some(Blob::Bytes(vec![0x0A, 0xFF])));
        assert_eq!(Blob::parse("ABC"), None);
        assert_eq!(Blob::parse("XY"), None);
    }

    #[test]
    fn test_unreadable_version_message() {
        let err = parse("Foo, Version=invalid").version().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Version qualification was provided, but was in an unrecognised format."
        );
    }

    #[test]
    fn test_unknown_architecture_message() {
        let err = parse("Foo, ProcessorArchitecture=Sparc")
            .processor_architecture()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ProcessorArchitecture qualification was provided, but was unrecognised."
        );
    }

    #[test]
    fn test_with_same_value_keeps_instance() {
        let assembly = parse("Foo, Culture=neutral");
        assert!(Arc::ptr_eq(&assembly.with_culture("neutral"), &assembly));
        assert!(Arc::ptr_eq(&assembly.without_qualification("Version"), &assembly));
    }

    #[test]
    fn test_with_replaces_in_place_and_appends() {
        let assembly = parse("Foo, Version=1.0, Culture=neutral");

        let replaced = assembly.with_version(Version::with_revision(2, 0, 0, 0));
        assert_eq!(replaced.to_string(), "Foo, Version=2.0.0.0, Culture=neutral");

        let appended = assembly.with_public_key_token(None);
        assert_eq!(appended.to_string(), "Foo, Version=1.0, Culture=neutral, PublicKeyToken=null");

        let removed = assembly.without_qualification("Version");
        assert_eq!(removed.to_string(), "Foo, Culture=neutral");
    }

    #[test]
    fn test_public_key_is_written_upper_case() {
        let assembly = parse("Foo").with_public_key(Some(&[0xab, 0x01]));
        assert_eq!(assembly.qualification("PublicKey"), Some("AB01"));
        assert_eq!(assembly.public_key().unwrap(), Some(Blob::Bytes(vec![0xAB, 0x01])));
    }
}
