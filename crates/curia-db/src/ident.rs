//! SQL identifiers as they appear in builder calls.
//!
//! An [`Ident`] is either a plain name (`users`, `users.id`, `users as u`,
//! `orders.*`) that the grammar quotes on output, or a raw [`Expression`]
//! that is spliced verbatim.
//!
//! Names are not validated when they are handed to a builder. The grammar
//! checks them while quoting:
//!
//! - the name must not be empty
//! - every dotted segment must be non-empty (`users.`, `.id`, `a..b` are rejected)
//! - an `as` alias must be non-empty and cannot carry a second `as`
//! - NUL characters are rejected

use crate::error::{CompileError, CompileResult};
use crate::value::Expression;

/// A table or column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ident {
    /// Name to be quoted segment by segment.
    Name(String),
    /// Raw SQL, never quoted.
    Raw(Expression),
}

impl Ident {
    /// Create a named identifier.
    pub fn name(name: impl Into<String>) -> Self {
        Ident::Name(name.into())
    }

    /// The `*` column.
    pub fn star() -> Self {
        Ident::Name("*".to_string())
    }

    /// Check if this is the bare `*` column.
    pub fn is_star(&self) -> bool {
        matches!(self, Ident::Name(n) if n == "*")
    }

    /// Check if this identifier is a raw expression.
    pub fn is_raw(&self) -> bool {
        matches!(self, Ident::Raw(_))
    }

    /// The column name a result row reports for this identifier: the alias
    /// when there is one, otherwise the last dotted segment.
    ///
    /// Raw expressions have no predictable name and return `None`.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Ident::Raw(_) => None,
            Ident::Name(name) => match split_alias(name) {
                Some((_, alias)) => Some(alias.trim()),
                None => name.rsplit('.').next().map(str::trim),
            },
        }
    }
}

/// Split `expr as alias` (case-insensitive, any surrounding whitespace).
///
/// Returns `None` when the value carries no alias.
pub(crate) fn split_alias(value: &str) -> Option<(&str, &str)> {
    let lower = value.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            let start = i;
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if bytes[j..].starts_with(b"as")
                && bytes.get(j + 2).is_some_and(|b| b.is_ascii_whitespace())
            {
                let mut k = j + 2;
                while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                return Some((&value[..start], &value[k..]));
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

/// Reject identifiers the grammar cannot quote.
pub(crate) fn check_name(name: &str) -> CompileResult<()> {
    if name.trim().is_empty() {
        return Err(CompileError::invalid_identifier(name, "identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(CompileError::invalid_identifier(
            name.replace('\0', "\\0"),
            "identifier cannot contain NUL character",
        ));
    }
    Ok(())
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> Ident;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> Ident {
        self
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> Ident {
        Ident::Name(self.to_string())
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> Ident {
        Ident::Name(self)
    }
}

impl IntoIdent for &String {
    fn into_ident(self) -> Ident {
        Ident::Name(self.clone())
    }
}

impl IntoIdent for Expression {
    fn into_ident(self) -> Ident {
        Ident::Raw(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> Ident {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_alias() {
        assert_eq!(split_alias("users as u"), Some(("users", "u")));
        assert_eq!(split_alias("users AS u"), Some(("users", "u")));
        assert_eq!(split_alias("count(*)   as   total"), Some(("count(*)", "total")));
        assert_eq!(split_alias("users"), None);
        assert_eq!(split_alias("bases"), None);
        assert_eq!(split_alias("has_assets"), None);
    }

    #[test]
    fn test_split_alias_empty_alias() {
        assert_eq!(split_alias("users as "), Some(("users", "")));
    }

    #[test]
    fn test_split_alias_takes_first_as() {
        assert_eq!(split_alias("a as b as c"), Some(("a", "b as c")));
    }

    #[test]
    fn test_output_name() {
        assert_eq!("name".into_ident().output_name(), Some("name"));
        assert_eq!("users.name".into_ident().output_name(), Some("name"));
        assert_eq!("users.name as n".into_ident().output_name(), Some("n"));
        assert_eq!(Expression::new("count(*)").into_ident().output_name(), None);
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("users").is_ok());
        assert!(check_name("").is_err());
        assert!(check_name("   ").is_err());
        assert!(check_name("us\0ers").is_err());
    }

    #[test]
    fn test_into_ident() {
        assert_eq!("id".into_ident(), Ident::Name("id".into()));
        assert!(Expression::new("count(*)").into_ident().is_raw());
        assert!(Ident::star().is_star());
    }
}
