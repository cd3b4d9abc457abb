//! Column type text: isolating it from constraints and reducing it to a
//! diagram token.

/// Words that end a column's type and start its constraint list.
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "NOT",
    "NULL",
    "DEFAULT",
    "AUTO_INCREMENT",
    "PRIMARY",
    "UNIQUE",
    "COMMENT",
    "REFERENCES",
    "COLLATE",
    "CHARACTER",
    "CHECK",
    "CONSTRAINT",
    "ON",
    "GENERATED",
    "AS",
    "VIRTUAL",
    "STORED",
];

/// Leading words of column types. MySQL's own names plus the common
/// spellings pasted in from other engines.
const TYPE_NAMES: &[&str] = &[
    "BIT", "BOOL", "BOOLEAN", "TINYINT", "SMALLINT", "MEDIUMINT", "MIDDLEINT", "INT", "INTEGER",
    "BIGINT", "INT1", "INT2", "INT3", "INT4", "INT8", "SERIAL", "BIGSERIAL", "SMALLSERIAL",
    "DECIMAL", "DEC", "NUMERIC", "FIXED", "FLOAT", "FLOAT4", "FLOAT8", "DOUBLE", "REAL", "MONEY",
    "DATE", "DATETIME", "TIMESTAMP", "TIMESTAMPTZ", "TIME", "YEAR", "INTERVAL", "CHAR",
    "CHARACTER", "VARCHAR", "VARCHAR2", "NCHAR", "NVARCHAR", "NATIONAL", "BINARY", "VARBINARY",
    "TINYBLOB", "BLOB", "MEDIUMBLOB", "LONGBLOB", "TINYTEXT", "TEXT", "MEDIUMTEXT", "LONGTEXT",
    "LONG", "CLOB", "BYTEA", "ENUM", "SET", "JSON", "JSONB", "UUID", "INET4", "INET6", "VECTOR",
    "GEOMETRY", "POINT", "LINESTRING", "POLYGON", "MULTIPOINT", "MULTILINESTRING",
    "MULTIPOLYGON", "GEOMETRYCOLLECTION", "GEOMCOLLECTION", "GEOGRAPHY",
];

/// Whether `word` can begin a column type.
pub fn is_type_name(word: &str) -> bool {
    TYPE_NAMES.iter().any(|t| t.eq_ignore_ascii_case(word))
}

/// Type text of a column given everything after its name.
///
/// `VARCHAR(255) NOT NULL DEFAULT ''` yields `VARCHAR(255)`; parenthesized
/// and quoted parts (`ENUM('a b', 'c')`) are never split.
pub fn extract_column_type(rest: &str) -> String {
    let rest = rest.trim();
    if rest.is_empty() {
        return "UNKNOWN".to_string();
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                let next = rest[i..].split_whitespace().next().unwrap_or_default();
                if CONSTRAINT_KEYWORDS.contains(&next.to_uppercase().as_str()) {
                    return rest[..i].trim().to_string();
                }
            }
            _ => {}
        }
    }

    rest.to_string()
}

/// Crow's-foot attribute type: upper case, size removed, word separators
/// folded to `_`.
pub fn diagram_type(declared: &str) -> String {
    let upper = declared.trim().to_uppercase();
    let base = upper.split('(').next().unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    let mut in_space = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        }
    }

    if out.is_empty() {
        "UNKNOWN".to_string()
    } else {
        out
    }
}
