//! Path element and path types.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// PathElement represents one level of path navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// Key of an object field.
    FieldName(String),
    /// Position inside a list. Only used to locate decoding errors; lists are
    /// atomic for diffing so exclusion patterns never contain indices.
    Index(usize),
}

impl PathElement {
    /// Creates a new field name path element.
    pub fn field_name(name: impl Into<String>) -> Self {
        PathElement::FieldName(name.into())
    }

    /// Creates a new index path element.
    pub fn index(i: usize) -> Self {
        PathElement::Index(i)
    }

    /// Returns the field name if this is a field name element.
    pub fn as_field_name(&self) -> Option<&str> {
        match self {
            PathElement::FieldName(name) => Some(name),
            _ => None,
        }
    }
}

/// Path is an absolute location in a document, e.g. `spec.template.spec`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    elements: Vec<PathElement>,
}

/// PathParseError is returned for malformed path expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{expression:?}: {message}")]
pub struct PathParseError {
    pub expression: String,
    pub message: String,
}

impl PathParseError {
    fn new(expression: &str, message: impl Into<String>) -> Self {
        PathParseError {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}

impl Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
        }
    }

    /// Creates a path of field names.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields.into_iter().map(PathElement::field_name).collect()
    }

    /// Parses a dot/bracket path expression.
    ///
    /// Segments are separated by dots. A segment may be written as `[key]` or
    /// `["key"]` so that it can contain dots, e.g.
    /// `metadata.annotations["example.com/owner"]`. A leading dot is allowed.
    pub fn parse(expression: &str) -> Result<Path, PathParseError> {
        let mut elements = Vec::new();
        let mut chars = expression.chars().peekable();

        if chars.peek() == Some(&'.') {
            chars.next();
        }

        loop {
            match chars.peek() {
                None => {
                    return Err(PathParseError::new(
                        expression,
                        "expected a segment after the last separator",
                    ))
                }
                Some('[') => {
                    chars.next();
                    elements.push(PathElement::FieldName(parse_bracketed(expression, &mut chars)?));
                }
                Some(_) => {
                    let mut segment = String::new();
                    while let Some(&c) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        if c == ']' {
                            return Err(PathParseError::new(expression, "unexpected ']'"));
                        }
                        segment.push(c);
                        chars.next();
                    }
                    if segment.is_empty() {
                        return Err(PathParseError::new(expression, "empty segment"));
                    }
                    elements.push(PathElement::FieldName(segment));
                }
            }

            match chars.peek() {
                None => break,
                Some('.') => {
                    chars.next();
                }
                Some('[') => {}
                Some(c) => {
                    return Err(PathParseError::new(
                        expression,
                        format!("unexpected {:?} after ']'", c),
                    ))
                }
            }
        }

        Ok(Path { elements })
    }

    /// Returns the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    /// Appends a path element.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Removes and returns the last path element.
    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    /// Returns the last path element.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Creates a new path with the given element appended.
    pub fn with(&self, element: PathElement) -> Self {
        let mut new_path = self.clone();
        new_path.push(element);
        new_path
    }

    /// Returns true if `self` is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.elements.starts_with(&self.elements)
    }

    /// Returns a slice of the path elements.
    pub fn as_slice(&self) -> &[PathElement] {
        &self.elements
    }
}

fn parse_bracketed(
    expression: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<String, PathParseError> {
    let mut segment = String::new();

    if chars.peek() == Some(&'"') {
        chars.next();
        loop {
            match chars.next() {
                None => return Err(PathParseError::new(expression, "unterminated quoted segment")),
                Some('"') => break,
                Some('\\') => match chars.next() {
                    Some(c) => segment.push(c),
                    None => {
                        return Err(PathParseError::new(expression, "dangling escape"))
                    }
                },
                Some(c) => segment.push(c),
            }
        }
        if chars.next() != Some(']') {
            return Err(PathParseError::new(expression, "expected ']' after quoted segment"));
        }
    } else {
        loop {
            match chars.next() {
                None => return Err(PathParseError::new(expression, "unterminated '['")),
                Some(']') => break,
                Some(c) => segment.push(c),
            }
        }
        // Only the quoted form can name the empty key.
        if segment.is_empty() {
            return Err(PathParseError::new(expression, "empty segment"));
        }
    }

    Ok(segment)
}

/// Returns true if the name can be written as a bare dotted segment.
fn is_plain_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains(['.', '[', ']', '"', '\\'])
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::FieldName(name) if is_plain_segment(name) => write!(f, ".{}", name),
            PathElement::FieldName(name) => {
                write!(f, "[\"")?;
                for c in name.chars() {
                    if c == '"' || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "\"]")
            }
            PathElement::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Field names print in the syntax [`Path::parse`] accepts, without the
/// leading dot, so a path of field names parses back to itself. List indices
/// print as `[i]` for diagnostics only; parsing reads them back as field
/// names. The empty path prints as `<root>`.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return write!(f, "<root>");
        }
        for (i, element) in self.elements.iter().enumerate() {
            match element {
                PathElement::FieldName(name) if i == 0 && is_plain_segment(name) => {
                    write!(f, "{}", name)?
                }
                _ => write!(f, "{}", element)?,
            }
        }
        Ok(())
    }
}
