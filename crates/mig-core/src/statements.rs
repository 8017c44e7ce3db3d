//! Statement splitting for migration files.

/// Split a migration's SQL text into individual statements.
///
/// Splits after every literal `;`, keeping the terminator on each statement,
/// trims surrounding whitespace, and drops fragments holding nothing but
/// whitespace and comments (a trailing `-- done` after the last `;`). The
/// split does not understand quoted strings, comments, or procedural blocks,
/// so a `;` inside any of those ends the statement.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split_inclusive(';')
        .map(str::trim)
        .filter(|s| has_sql(s))
        .collect()
}

/// Whether `fragment` holds anything besides whitespace, comments and `;`.
fn has_sql(fragment: &str) -> bool {
    let mut rest = fragment.trim_end_matches(';');
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return !rest.trim_end().is_empty();
        }
    }
}
