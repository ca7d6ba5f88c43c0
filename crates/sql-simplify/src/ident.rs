//! SQL identifier checks.
//!
//! Table and column names are interpolated into statements as-is, so every name
//! passes through [`check_ident`] first.
//!
//! - Parts must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Parts may be joined with `.` (`users.id`, `shop.users.id`)
//! - Projections additionally accept `*` as the last part (`*`, `users.*`)

use crate::error::{OrmError, OrmResult};

/// Validate a (possibly dotted) identifier.
pub(crate) fn check_ident(name: &str) -> OrmResult<()> {
    check_parts(name, false)
}

/// Validate a projection entry of a join: an identifier, `*`, or `table.*`.
pub(crate) fn check_projection(name: &str) -> OrmResult<()> {
    check_parts(name, true)
}

/// Whether `name` already carries a table qualifier.
pub(crate) fn is_qualified(name: &str) -> bool {
    name.contains('.')
}

fn check_parts(name: &str, allow_star: bool) -> OrmResult<()> {
    if name.is_empty() {
        return Err(OrmError::validation("Identifier cannot be empty"));
    }

    let parts: Vec<&str> = name.split('.').collect();
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if allow_star && i == last && *part == "*" {
            continue;
        }
        check_part(name, part)?;
    }
    Ok(())
}

fn check_part(full: &str, part: &str) -> OrmResult<()> {
    let mut chars = part.chars();
    match chars.next() {
        None => {
            return Err(OrmError::validation(format!(
                "Empty identifier segment in '{full}'"
            )));
        }
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(OrmError::validation(format!(
                "Invalid identifier start character '{c}' in '{full}'"
            )));
        }
    }
    if let Some(c) = chars.find(|c| !(*c == '_' || *c == '$' || c.is_ascii_alphanumeric())) {
        return Err(OrmError::validation(format!(
            "Invalid character '{c}' in identifier '{full}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple_and_dotted() {
        assert!(check_ident("users").is_ok());
        assert!(check_ident("users.id").is_ok());
        assert!(check_ident("shop.users.id").is_ok());
        assert!(check_ident("my_var$1").is_ok());
    }

    #[test]
    fn ident_rejects_unsafe() {
        assert!(check_ident("").is_err());
        assert!(check_ident("1users").is_err());
        assert!(check_ident("users..name").is_err());
        assert!(check_ident("users.").is_err());
        assert!(check_ident("users name").is_err());
        assert!(check_ident("users; drop table users; --").is_err());
        assert!(check_ident("*").is_err());
    }

    #[test]
    fn projection_accepts_star() {
        assert!(check_projection("*").is_ok());
        assert!(check_projection("users.*").is_ok());
        assert!(check_projection("users.name").is_ok());
        assert!(check_projection("*.users").is_err());
        assert!(check_projection("COUNT(*)").is_err());
    }

    #[test]
    fn qualified_detection() {
        assert!(is_qualified("orders.user_id"));
        assert!(!is_qualified("user_id"));
    }
}
