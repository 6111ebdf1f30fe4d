//! Package version extraction from the C version headers.

use crate::patterns;
use crate::validate::Validator;
use crate::vcs::Vcs;
use anyhow::Result;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// The two packages this tooling lands for. Anything else is a defect in
/// the caller, which a closed enum makes unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Nss,
    Nspr,
}

impl Component {
    pub fn name(self) -> &'static str {
        match self {
            Component::Nss => "NSS",
            Component::Nspr => "NSPR",
        }
    }

    fn version_pattern(self) -> Regex {
        match self {
            Component::Nss => patterns::nss_version(),
            Component::Nspr => patterns::nspr_version(),
        }
    }

    /// Fixed header path per component, probed in declaration order.
    fn header_path(self) -> &'static str {
        match self {
            Component::Nss => "lib/nss/nss.h",
            Component::Nspr => "pr/include/prinit.h",
        }
    }
}

/// A component plus the dotted version number its header declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageVersion {
    pub component: Component,
    pub number: String,
}

/// First match of `pattern` in `contents`. No match means the header is
/// unusable; there is no fallback version.
pub fn extract_version(
    contents: &str,
    pattern: &Regex,
    validator: &mut dyn Validator,
) -> Result<String> {
    match pattern
        .captures(contents)
        .and_then(|caps| caps.name("version"))
    {
        Some(version) => Ok(version.as_str().to_string()),
        None => Err(validator.fatal("Unknown version")),
    }
}

impl PackageVersion {
    pub fn from_header(
        component: Component,
        header: &str,
        validator: &mut dyn Validator,
    ) -> Result<Self> {
        let number = extract_version(header, &component.version_pattern(), validator)?;
        Ok(Self { component, number })
    }

    /// Probe the fixed header paths in priority order, reading the one that
    /// exists through the VCS at `rev`.
    pub fn from_repo(
        vcs: &dyn Vcs,
        root: &Path,
        rev: Option<&str>,
        validator: &mut dyn Validator,
    ) -> Result<Self> {
        for component in [Component::Nss, Component::Nspr] {
            if !root.join(component.header_path()).is_file() {
                continue;
            }
            let contents = vcs.cat(component.header_path(), rev)?;
            return Self::from_header(component, &String::from_utf8_lossy(&contents), validator);
        }
        Err(validator.fatal("No version files found"))
    }

    /// `3.68.1` -> `3_68_1`, the form embedded in release tags.
    pub fn tag_fragment(&self) -> String {
        self.number.replace('.', "_")
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.component.name(), self.number)
    }
}
