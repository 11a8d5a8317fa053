//! Route pattern parsing and matching
//!
//! Patterns are `/`-separated; a segment in braces is a parameter, optionally
//! constrained: `/api/orders/{id:int}`. Static segments match
//! case-insensitively and trailing slashes are ignored.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RoutePatternError {
    #[error("Invalid pattern syntax: {0}")]
    InvalidSyntax(String),
    #[error("Unknown constraint '{0}'")]
    UnknownConstraint(String),
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),
}

/// Parameter constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamConstraint {
    None,
    Int,
    Guid,
    Alpha,
}

impl ParamConstraint {
    fn parse(s: &str) -> Result<Self, RoutePatternError> {
        match s {
            "int" | "long" => Ok(ParamConstraint::Int),
            "guid" | "uuid" => Ok(ParamConstraint::Guid),
            "alpha" => Ok(ParamConstraint::Alpha),
            other => Err(RoutePatternError::UnknownConstraint(other.to_string())),
        }
    }

    pub fn validate(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self {
            ParamConstraint::None => true,
            ParamConstraint::Int => value.parse::<i64>().is_ok(),
            ParamConstraint::Guid => uuid::Uuid::parse_str(value).is_ok(),
            ParamConstraint::Alpha => value.chars().all(char::is_alphabetic),
        }
    }

    /// OpenAPI `type`/`format` pair for documentation
    pub fn schema_type(&self) -> (&'static str, Option<&'static str>) {
        match self {
            ParamConstraint::Int => ("integer", Some("int64")),
            ParamConstraint::Guid => ("string", Some("uuid")),
            ParamConstraint::None | ParamConstraint::Alpha => ("string", None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Static(String),
    Parameter {
        name: String,
        constraint: ParamConstraint,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    segments: Vec<PathSegment>,
}

impl RoutePattern {
    pub fn parse(path: &str) -> Result<Self, RoutePatternError> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let segment = raw.trim();
            if let Some(definition) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                let (name, constraint) = match definition.split_once(':') {
                    Some((name, constraint)) => (name.trim(), ParamConstraint::parse(constraint.trim())?),
                    None => (definition.trim(), ParamConstraint::None),
                };
                if name.is_empty() {
                    return Err(RoutePatternError::InvalidSyntax(format!(
                        "Parameter name cannot be empty in '{}'",
                        path
                    )));
                }
                if !seen.insert(name.to_string()) {
                    return Err(RoutePatternError::DuplicateParameter(name.to_string()));
                }
                segments.push(PathSegment::Parameter {
                    name: name.to_string(),
                    constraint,
                });
            } else if segment.contains('{') || segment.contains('}') {
                return Err(RoutePatternError::InvalidSyntax(format!(
                    "Unbalanced braces in segment '{}'",
                    segment
                )));
            } else {
                segments.push(PathSegment::Static(segment.to_string()));
            }
        }

        Ok(Self { segments })
    }

    /// Match a request path, returning the captured parameters
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                PathSegment::Static(expected) => {
                    if !expected.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                PathSegment::Parameter { name, constraint } => {
                    if !constraint.validate(part) {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> impl Iterator<Item = (&str, ParamConstraint)> {
        self.segments.iter().filter_map(|segment| match segment {
            PathSegment::Parameter { name, constraint } => Some((name.as_str(), *constraint)),
            PathSegment::Static(_) => None,
        })
    }

    /// Canonical template without constraints, e.g. `/api/orders/{id}`
    pub fn template(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Static(s) => format!("/{}", s),
                PathSegment::Parameter { name, .. } => format!("/{{{}}}", name),
            })
            .collect()
    }

    /// Two patterns are ambiguous when they would match the same paths
    pub fn is_equivalent(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|pair| match pair {
                (PathSegment::Static(a), PathSegment::Static(b)) => a.eq_ignore_ascii_case(b),
                (
                    PathSegment::Parameter { constraint: a, .. },
                    PathSegment::Parameter { constraint: b, .. },
                ) => a == b,
                _ => false,
            })
    }
}
