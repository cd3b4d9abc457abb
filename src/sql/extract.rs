//! `CREATE TABLE` block extraction.

use super::lexer::strip_comments;

const CREATE_TABLE: &str = "create table";

/// A table name and the raw text between its outer parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub name: String,
    pub body: String,
}

/// Reduce a possibly qualified, quoted identifier to its bare name.
///
/// `` `shop`.`users` `` becomes `users`, `name(10)` becomes `name`.
pub fn normalize_identifier(token: &str) -> String {
    let token = token.trim();
    if token.is_empty() {
        return String::new();
    }

    let token = strip_trailing_group(token).trim();
    let is_quote = |c: char| c == '`' || c == '"';

    token
        .split('.')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().trim_matches(is_quote))
        .last()
        .unwrap_or_else(|| token.trim_matches(is_quote))
        .to_string()
}

/// Drop a trailing `( ... )` group that contains no closing paren.
fn strip_trailing_group(s: &str) -> &str {
    let Some(inner) = s.strip_suffix(')') else {
        return s;
    };
    let from = inner.rfind(')').map_or(0, |i| i + 1);
    match inner[from..].find('(') {
        Some(open) => &s[..from + open],
        None => s,
    }
}

/// Strip `keyword` plus following whitespace from the start of `s`.
fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let head = s.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &s[keyword.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

fn strip_if_not_exists(header: &str) -> &str {
    strip_keyword(header, "if")
        .and_then(|s| strip_keyword(s, "not"))
        .and_then(|s| strip_keyword(s, "exists"))
        .unwrap_or(header)
}

/// Byte offset of the paren closing the one at `open`. Quotes are not
/// considered here.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find every `CREATE TABLE` statement and its body.
///
/// A statement without an opening paren, or whose paren is never closed,
/// ends the scan; blocks found before it are still returned.
pub fn extract_create_table_blocks(sql: &str) -> Vec<TableBlock> {
    let cleaned = strip_comments(sql);
    // ASCII lowering keeps byte offsets aligned with `cleaned`.
    let lower = cleaned.to_ascii_lowercase();
    let mut blocks = Vec::new();
    let mut idx = 0;

    while let Some(found) = lower[idx..].find(CREATE_TABLE) {
        let start = idx + found;
        let header_start = start + CREATE_TABLE.len();

        let Some(open) = cleaned[header_start..].find('(').map(|i| header_start + i) else {
            tracing::debug!(offset = start, "create table without column list");
            break;
        };

        let header = cleaned[header_start..open].trim();
        let name = normalize_identifier(strip_if_not_exists(header));

        let Some(close) = matching_paren(&cleaned, open) else {
            tracing::debug!(table = %name, "unbalanced parentheses, stopping extraction");
            break;
        };

        if !name.is_empty() {
            blocks.push(TableBlock {
                name,
                body: cleaned[open + 1..close].to_string(),
            });
        }

        idx = close + 1;
    }

    tracing::debug!(count = blocks.len(), "extracted create table blocks");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("users"), "users");
        assert_eq!(normalize_identifier(" `users` "), "users");
        assert_eq!(normalize_identifier("`shop`.`users`"), "users");
        assert_eq!(normalize_identifier("\"public\".orders"), "orders");
        assert_eq!(normalize_identifier("name(10)"), "name");
        assert_eq!(normalize_identifier(""), "");
    }

    #[test]
    fn test_extract_single_block() {
        let blocks = extract_create_table_blocks("CREATE TABLE users (id INT, name VARCHAR(50));");
        assert_eq!(
            blocks,
            vec![TableBlock {
                name: "users".into(),
                body: "id INT, name VARCHAR(50)".into(),
            }]
        );
    }

    #[test]
    fn test_extract_if_not_exists_and_schema() {
        let sql = "create table IF  NOT EXISTS `app`.`orders` (id INT) ENGINE=InnoDB;\n\
                   Create Table items(id INT);";
        let names: Vec<String> = extract_create_table_blocks(sql)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["orders", "items"]);
    }

    #[test]
    fn test_extract_ignores_commented_statements() {
        let sql = "-- CREATE TABLE ghost (id INT);\nCREATE TABLE real_one (id INT);";
        let blocks = extract_create_table_blocks(sql);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "real_one");
    }

    #[test]
    fn test_unbalanced_block_stops_extraction() {
        let sql = "CREATE TABLE a (id INT); CREATE TABLE b (id INT; CREATE TABLE c (id INT);";
        let blocks = extract_create_table_blocks(sql);
        // b swallows c's parens and never closes
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "a");
    }

    #[test]
    fn test_missing_paren_stops_extraction() {
        let sql = "CREATE TABLE a (id INT); CREATE TABLE b LIKE a;";
        assert_eq!(extract_create_table_blocks(sql).len(), 1);
    }

    #[test]
    fn test_no_statements() {
        assert!(extract_create_table_blocks("").is_empty());
        assert!(extract_create_table_blocks("ALTER TABLE a ADD COLUMN b INT;").is_empty());
    }
}
