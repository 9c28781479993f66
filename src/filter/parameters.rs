//! filter::parameters
//!
//! Parameter declarations and argument binding.
//!
//! A filter declares its inputs as a list of [`ParameterSpec`]s. Callers
//! supply an [`Arguments`] map; [`bind`] checks it against the declarations,
//! fills defaults, coerces values to the declared kinds and reports every
//! problem as a diagnostic.
//!
//! # Coercions
//!
//! - integer -> float
//! - string -> file path
//! - string -> data path (parsed; a malformed path is `InvalidPath`)

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::result::{DiagnosticCode, ExecutionResult};
use crate::core::path::DataPath;

/// Kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Bool,
    Integer,
    Float,
    String,
    FilePath,
    DataPath,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::Bool => "bool",
            ParameterKind::Integer => "integer",
            ParameterKind::Float => "float",
            ParameterKind::String => "string",
            ParameterKind::FilePath => "file path",
            ParameterKind::DataPath => "data path",
        };
        write!(f, "{}", name)
    }
}

/// A parameter value.
///
/// Deserializes from plain JSON/TOML scalars; strings arrive as
/// [`ParameterValue::String`] and are coerced during binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    FilePath(PathBuf),
    DataPath(DataPath),
}

impl ParameterValue {
    /// The kind this value naturally has, before coercion.
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Bool(_) => ParameterKind::Bool,
            ParameterValue::Integer(_) => ParameterKind::Integer,
            ParameterValue::Float(_) => ParameterKind::Float,
            ParameterValue::String(_) => ParameterKind::String,
            ParameterValue::FilePath(_) => ParameterKind::FilePath,
            ParameterValue::DataPath(_) => ParameterKind::DataPath,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Float(x) => write!(f, "{}", x),
            ParameterValue::String(s) => write!(f, "\"{}\"", s),
            ParameterValue::FilePath(p) => write!(f, "{}", p.display()),
            ParameterValue::DataPath(p) => write!(f, "{}", p),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Integer(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::String(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::String(v)
    }
}

impl From<PathBuf> for ParameterValue {
    fn from(v: PathBuf) -> Self {
        ParameterValue::FilePath(v)
    }
}

impl From<&std::path::Path> for ParameterValue {
    fn from(v: &std::path::Path) -> Self {
        ParameterValue::FilePath(v.to_path_buf())
    }
}

impl From<DataPath> for ParameterValue {
    fn from(v: DataPath) -> Self {
        ParameterValue::DataPath(v)
    }
}

/// Extra restriction on a bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Numeric range; integers are compared as floats.
    Range { min: Bound<f64>, max: Bound<f64> },
    /// String or path must not be empty.
    NonEmpty,
}

impl Constraint {
    fn check(&self, value: &ParameterValue) -> Result<(), String> {
        match self {
            Constraint::Range { min, max } => {
                let x = match value {
                    ParameterValue::Integer(i) => *i as f64,
                    ParameterValue::Float(x) => *x,
                    _ => return Ok(()),
                };
                let above = match min {
                    Bound::Included(m) => x >= *m,
                    Bound::Excluded(m) => x > *m,
                    Bound::Unbounded => true,
                };
                let below = match max {
                    Bound::Included(m) => x <= *m,
                    Bound::Excluded(m) => x < *m,
                    Bound::Unbounded => true,
                };
                if above && below {
                    Ok(())
                } else {
                    Err(format!("{} is outside {}", x, self))
                }
            }
            Constraint::NonEmpty => {
                let empty = match value {
                    ParameterValue::String(s) => s.is_empty(),
                    ParameterValue::FilePath(p) => p.as_os_str().is_empty(),
                    _ => false,
                };
                if empty {
                    Err("value must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range { min, max } => {
                match min {
                    Bound::Included(m) => write!(f, "[{}", m)?,
                    Bound::Excluded(m) => write!(f, "({}", m)?,
                    Bound::Unbounded => write!(f, "(-inf")?,
                }
                write!(f, ", ")?;
                match max {
                    Bound::Included(m) => write!(f, "{}]", m),
                    Bound::Excluded(m) => write!(f, "{})", m),
                    Bound::Unbounded => write!(f, "inf)"),
                }
            }
            Constraint::NonEmpty => write!(f, "non-empty"),
        }
    }
}

/// Declaration of one filter parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub key: &'static str,
    pub human_name: &'static str,
    pub help: &'static str,
    pub kind: ParameterKind,
    /// `None` makes the parameter required.
    pub default: Option<ParameterValue>,
    pub constraint: Option<Constraint>,
}

impl ParameterSpec {
    pub fn required(key: &'static str, human_name: &'static str, kind: ParameterKind) -> Self {
        Self {
            key,
            human_name,
            help: "",
            kind,
            default: None,
            constraint: None,
        }
    }

    pub fn optional(
        key: &'static str,
        human_name: &'static str,
        kind: ParameterKind,
        default: impl Into<ParameterValue>,
    ) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::required(key, human_name, kind)
        }
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Errors from typed argument access.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("argument '{0}' is not set")]
    Missing(String),

    #[error("argument '{key}' is not a {expected}")]
    WrongType {
        key: String,
        expected: ParameterKind,
    },
}

/// Named argument values for one filter invocation.
///
/// # Example
///
/// ```
/// use meshpipe::filter::parameters::Arguments;
///
/// let args = Arguments::new()
///     .with("file_path", "cube.stl")
///     .with("scale_factor", 2.0)
///     .with("apply_scale", true);
/// assert_eq!(args.len(), 3);
/// assert!(args.get_bool("apply_scale").unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments {
    values: BTreeMap<String, ParameterValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, key: &str) -> Result<&ParameterValue, ArgumentError> {
        self.values
            .get(key)
            .ok_or_else(|| ArgumentError::Missing(key.to_string()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ArgumentError> {
        match self.require(key)? {
            ParameterValue::Bool(b) => Ok(*b),
            _ => Err(wrong_type(key, ParameterKind::Bool)),
        }
    }

    pub fn get_integer(&self, key: &str) -> Result<i64, ArgumentError> {
        match self.require(key)? {
            ParameterValue::Integer(i) => Ok(*i),
            _ => Err(wrong_type(key, ParameterKind::Integer)),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<f64, ArgumentError> {
        match self.require(key)? {
            ParameterValue::Float(x) => Ok(*x),
            ParameterValue::Integer(i) => Ok(*i as f64),
            _ => Err(wrong_type(key, ParameterKind::Float)),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<&str, ArgumentError> {
        match self.require(key)? {
            ParameterValue::String(s) => Ok(s),
            _ => Err(wrong_type(key, ParameterKind::String)),
        }
    }

    pub fn get_file_path(&self, key: &str) -> Result<PathBuf, ArgumentError> {
        match self.require(key)? {
            ParameterValue::FilePath(p) => Ok(p.clone()),
            ParameterValue::String(s) => Ok(PathBuf::from(s)),
            _ => Err(wrong_type(key, ParameterKind::FilePath)),
        }
    }

    pub fn get_data_path(&self, key: &str) -> Result<DataPath, ArgumentError> {
        match self.require(key)? {
            ParameterValue::DataPath(p) => Ok(p.clone()),
            ParameterValue::String(s) => {
                DataPath::parse(s).map_err(|_| wrong_type(key, ParameterKind::DataPath))
            }
            _ => Err(wrong_type(key, ParameterKind::DataPath)),
        }
    }
}

fn wrong_type(key: &str, expected: ParameterKind) -> ArgumentError {
    ArgumentError::WrongType {
        key: key.to_string(),
        expected,
    }
}

impl FromIterator<(String, ParameterValue)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Bind raw arguments against parameter declarations.
///
/// Returns the bound arguments (defaults filled, values coerced to their
/// declared kinds) and the diagnostics found. The bound arguments are only
/// meaningful when the result has no errors.
pub fn bind(specs: &[ParameterSpec], raw: &Arguments) -> (Arguments, ExecutionResult) {
    let mut result = ExecutionResult::new();
    let mut bound = Arguments::new();

    for (key, _) in raw.iter() {
        if !specs.iter().any(|s| s.key == key) {
            result.push_error(
                DiagnosticCode::UnknownParameter,
                format!("unknown parameter '{}'", key),
            );
        }
    }

    for spec in specs {
        let value = match (raw.get(spec.key), &spec.default) {
            (Some(v), _) => v,
            (None, Some(default)) => default,
            (None, None) => {
                result.push_error(
                    DiagnosticCode::MissingParameter,
                    format!("required parameter '{}' ({}) is missing", spec.key, spec.human_name),
                );
                continue;
            }
        };
        match coerce(spec, value) {
            Ok(value) => {
                if let Some(constraint) = &spec.constraint {
                    if let Err(reason) = constraint.check(&value) {
                        let code = match constraint {
                            Constraint::Range { .. } => DiagnosticCode::OutOfRange,
                            Constraint::NonEmpty => DiagnosticCode::EmptyValue,
                        };
                        result.push_error(code, format!("parameter '{}': {}", spec.key, reason));
                        continue;
                    }
                }
                bound.insert(spec.key, value);
            }
            Err((code, message)) => result.push_error(code, message),
        }
    }

    log::debug!("bound {} argument(s): {}", bound.len(), result.summary());
    (bound, result)
}

fn coerce(
    spec: &ParameterSpec,
    value: &ParameterValue,
) -> Result<ParameterValue, (DiagnosticCode, String)> {
    use ParameterValue as V;

    let coerced = match (spec.kind, value) {
        (ParameterKind::Bool, V::Bool(_))
        | (ParameterKind::Integer, V::Integer(_))
        | (ParameterKind::Float, V::Float(_))
        | (ParameterKind::String, V::String(_))
        | (ParameterKind::FilePath, V::FilePath(_))
        | (ParameterKind::DataPath, V::DataPath(_)) => value.clone(),
        (ParameterKind::Float, V::Integer(i)) => V::Float(*i as f64),
        (ParameterKind::FilePath, V::String(s)) => V::FilePath(PathBuf::from(s)),
        (ParameterKind::DataPath, V::String(s)) => match DataPath::parse(s) {
            Ok(path) => V::DataPath(path),
            Err(e) => {
                return Err((
                    DiagnosticCode::InvalidPath,
                    format!("parameter '{}': '{}' is not a valid data path: {}", spec.key, s, e),
                ))
            }
        },
        (expected, other) => {
            return Err((
                DiagnosticCode::ParameterTypeError,
                format!(
                    "parameter '{}' expects a {}, got {} ({})",
                    spec.key,
                    expected,
                    other.kind(),
                    other
                ),
            ))
        }
    };
    Ok(coerced)
}
