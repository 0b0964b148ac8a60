//! Package versions and version requirements
//!
//! Versions are dotted sequences such as `1.0`, `2.3.2` or `1.0.pre`. Unlike
//! semver there is no fixed number of components, and the original text is
//! kept so directory and archive names match what the fixture declared.

use crate::{PackageError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// One component of a version. Text sorts below any number, so
/// `1.0.pre < 1.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Segment {
    Text(String),
    Number(u64),
}

/// Parsed package version
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl PackageVersion {
    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let invalid = |reason: &str| PackageError::InvalidVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("version cannot be empty"));
        }
        if !raw.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid("must start with a digit"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !part.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("segments may only contain letters and digits"));
            }
            // `pre1` splits into `pre` and `1`
            let mut rest = part;
            while !rest.is_empty() {
                let digits = rest.starts_with(|c: char| c.is_ascii_digit());
                let end = rest
                    .find(|c: char| c.is_ascii_digit() != digits)
                    .unwrap_or(rest.len());
                let (run, tail) = rest.split_at(end);
                if digits {
                    let n = run
                        .parse::<u64>()
                        .map_err(|_| invalid("numeric segment out of range"))?;
                    segments.push(Segment::Number(n));
                } else {
                    segments.push(Segment::Text(run.to_string()));
                }
                rest = tail;
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The version exactly as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether any segment is alphabetic (`1.0.pre`, `2.0.rc1`)
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Text(_)))
    }

    /// Numeric segments up to the first alphabetic one
    fn release_numbers(&self) -> Vec<u64> {
        self.segments
            .iter()
            .map_while(|s| match s {
                Segment::Number(n) => Some(*n),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Release form with prerelease segments dropped
    pub fn release(&self) -> PackageVersion {
        if !self.is_prerelease() {
            return self.clone();
        }
        Self::from_numbers(&self.release_numbers())
    }

    /// Upper bound used by the pessimistic operator: drop the last segment
    /// and increment the one before it (`1.2.3` becomes `1.3`).
    ///
    /// `None` when the incremented segment would overflow.
    pub fn bump(&self) -> Option<PackageVersion> {
        let mut numbers = self.release_numbers();
        if numbers.len() > 1 {
            numbers.pop();
        }
        match numbers.last_mut() {
            Some(last) => *last = last.checked_add(1)?,
            None => numbers.push(1),
        }
        Some(Self::from_numbers(&numbers))
    }

    fn from_numbers(numbers: &[u64]) -> PackageVersion {
        let raw = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        PackageVersion {
            raw,
            segments: numbers.iter().copied().map(Segment::Number).collect(),
        }
    }

    /// Segments with trailing zeros removed; `1.0` and `1` share this form
    fn canonical(&self) -> &[Segment] {
        let mut end = self.segments.len();
        while end > 1 && self.segments[end - 1] == Segment::Number(0) {
            end -= 1;
        }
        &self.segments[..end]
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        let zero = Segment::Number(0);
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&zero);
            let b = other.segments.get(i).unwrap_or(&zero);
            match a.cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PackageVersion {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Requirement operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// `~>`: at least this version, below its bump
    Pessimistic,
}

impl Op {
    /// Operators in the order they must be tried when parsing, longest first
    const PREFIXES: [(&'static str, Op); 7] = [
        ("~>", Op::Pessimistic),
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("!=", Op::Ne),
        ("=", Op::Eq),
        (">", Op::Gt),
        ("<", Op::Lt),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Pessimistic => "~>",
        }
    }
}

/// Single `op version` constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub op: Op,
    pub version: PackageVersion,
}

impl Constraint {
    fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (op, rest) = Op::PREFIXES
            .iter()
            .find_map(|(prefix, op)| trimmed.strip_prefix(prefix).map(|rest| (*op, rest)))
            .unwrap_or((Op::Eq, trimmed));

        let version = PackageVersion::parse(rest).map_err(|e| PackageError::InvalidRequirement {
            input: input.trim().to_string(),
            reason: e.to_string(),
        })?;

        if op == Op::Pessimistic && version.bump().is_none() {
            return Err(PackageError::InvalidRequirement {
                input: input.trim().to_string(),
                reason: format!("upper bound of '{}' overflows", version),
            });
        }

        Ok(Self { op, version })
    }

    pub fn matches(&self, version: &PackageVersion) -> bool {
        match self.op {
            Op::Eq => version == &self.version,
            Op::Ne => version != &self.version,
            Op::Gt => version > &self.version,
            Op::Lt => version < &self.version,
            Op::Ge => version >= &self.version,
            Op::Le => version <= &self.version,
            Op::Pessimistic => {
                version >= &self.version
                    && self
                        .version
                        .bump()
                        .map_or(true, |upper| version.release() < upper)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.version)
    }
}

/// Version requirement: every constraint must hold
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    constraints: Vec<Constraint>,
}

impl Requirement {
    /// Parse a comma separated requirement (`">= 2.0, < 3"`). An empty
    /// string means any version.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }

        let constraints = input
            .split(',')
            .map(Constraint::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { constraints })
    }

    /// Requirement pinned to exactly one version
    pub fn exact(version: PackageVersion) -> Self {
        Self {
            constraints: vec![Constraint {
                op: Op::Eq,
                version,
            }],
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn matches(&self, version: &PackageVersion) -> bool {
        self.constraints.iter().all(|c| c.matches(version))
    }

    /// Whether this is the catch-all `>= 0`
    pub fn is_any(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for Requirement {
    fn default() -> Self {
        Self {
            constraints: vec![Constraint {
                op: Op::Ge,
                version: PackageVersion::from_numbers(&[0]),
            }],
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(", "))
    }
}

impl FromStr for Requirement {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Requirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
