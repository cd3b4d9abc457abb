//! Definition classifier and schema assembly for `CREATE TABLE` bodies.

use super::extract::{extract_create_table_blocks, normalize_identifier};
use super::lexer::{split_top_level, Lexer, Spanned, Token};
use super::types::{extract_column_type, is_type_name};
use crate::ast::{Column, ForeignKey, Schema, Table};
use std::collections::{BTreeSet, HashMap};

/// Leading keywords of table-level metadata that carry no relations.
const IGNORED_STARTERS: &[&str] = &["UNIQUE", "KEY", "INDEX", "CHECK", "FULLTEXT", "SPATIAL"];

/// Longest definition prefix quoted in a warning.
const WARNING_PREFIX_CHARS: usize = 120;

/// One top-level entry of a table body.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    PrimaryKey(Vec<String>),
    ForeignKey(ForeignKey),
    Column(ColumnDef),
    /// Indexes, checks and other metadata that is skipped silently.
    Constraint,
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub column: Column,
    pub primary: bool,
    pub references: Option<ForeignKey>,
}

/// Parse every `CREATE TABLE` statement in `sql`.
///
/// Never fails: unknown definitions become warnings and broken statements
/// cut extraction short.
pub fn parse_schema(sql: &str) -> Schema {
    let mut tables: Vec<Table> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut warnings = Vec::new();

    for block in extract_create_table_blocks(sql) {
        let slot = *index.entry(block.name.clone()).or_insert_with(|| {
            tables.push(Table::new(block.name.clone()));
            tables.len() - 1
        });
        let table = &mut tables[slot];

        for definition in split_top_level(&block.body, ',') {
            match classify(&definition) {
                Definition::PrimaryKey(cols) => table.primary_keys.extend(cols),
                Definition::ForeignKey(fk) => table.foreign_keys.push(fk),
                Definition::Column(def) => {
                    if def.primary {
                        table.primary_keys.insert(def.column.name.clone());
                    }
                    if let Some(fk) = def.references {
                        table.foreign_keys.push(fk);
                    }
                    table.columns.push(def.column);
                }
                Definition::Constraint => {}
                Definition::Unrecognized(text) => {
                    tracing::debug!(table = %table.name, definition = %text, "unrecognized definition");
                    warnings.push(format!("unrecognized definition: {}", truncate(&text)));
                }
            }
        }
    }

    for table in &mut tables {
        enforce_declared_columns(table, &mut warnings);
    }

    Schema { tables, warnings }
}

/// Drop primary-key names and foreign keys that point at columns the table
/// never declares; the rest are respelled the way their columns are declared.
fn enforce_declared_columns(table: &mut Table, warnings: &mut Vec<String>) {
    let mut primary_keys = BTreeSet::new();
    for name in std::mem::take(&mut table.primary_keys) {
        match table.declared_column(&name) {
            Some(declared) => {
                primary_keys.insert(declared.to_string());
            }
            None => warnings.push(format!(
                "primary key column `{}` is not declared in table `{}`",
                name, table.name
            )),
        }
    }
    table.primary_keys = primary_keys;

    let mut kept = Vec::with_capacity(table.foreign_keys.len());
    for mut fk in std::mem::take(&mut table.foreign_keys) {
        let declared: Option<Vec<String>> = fk
            .columns
            .iter()
            .map(|c| table.declared_column(c).map(str::to_string))
            .collect();
        match declared {
            Some(columns) => {
                fk.columns = columns;
                kept.push(fk);
            }
            None => warnings.push(format!(
                "foreign key ({}) on table `{}` uses undeclared columns",
                fk.columns.join(", "),
                table.name
            )),
        }
    }
    table.foreign_keys = kept;
}

fn truncate(text: &str) -> String {
    text.chars().take(WARNING_PREFIX_CHARS).collect()
}

/// Classify a single definition from a table body.
pub fn classify(definition: &str) -> Definition {
    let definition = definition.trim();
    let tokens = Lexer::new(definition).tokenize();
    let cursor = Cursor::new(definition, &tokens);

    if cursor.at_keywords(&["PRIMARY", "KEY"]) {
        return Definition::PrimaryKey(primary_key_columns(cursor));
    }

    if let Some(fk) = parse_foreign_key(cursor.clone()) {
        return Definition::ForeignKey(fk);
    }

    if cursor.at_keyword("CONSTRAINT") {
        if let Some(def) = parse_named_constraint(cursor.clone()) {
            return def;
        }
    }

    if !starts_constraint(&cursor) {
        if let Some(def) = parse_column(cursor.clone()) {
            return Definition::Column(def);
        }
    }

    if IGNORED_STARTERS.iter().any(|kw| cursor.at_keyword(kw)) {
        Definition::Constraint
    } else {
        Definition::Unrecognized(definition.to_string())
    }
}

fn starts_constraint(cursor: &Cursor<'_>) -> bool {
    cursor.at_keyword("CONSTRAINT")
        || cursor.at_keywords(&["FOREIGN", "KEY"])
        || IGNORED_STARTERS.iter().any(|kw| cursor.at_keyword(kw))
}

/// Columns of `PRIMARY KEY [USING ...] (a, b)`; cursor sits on `PRIMARY`.
fn primary_key_columns(mut cursor: Cursor<'_>) -> Vec<String> {
    cursor.keyword("PRIMARY");
    cursor.keyword("KEY");
    while cursor.peek().is_some_and(|t| matches!(t, Token::Word(_))) {
        cursor.advance();
    }
    cursor
        .group()
        .map(identifier_list)
        .unwrap_or_default()
}

/// `[CONSTRAINT name] FOREIGN KEY [index] (cols) REFERENCES table (cols)`
fn parse_foreign_key(mut cursor: Cursor<'_>) -> Option<ForeignKey> {
    let mut constraint_name = None;
    if cursor.keyword("CONSTRAINT") && !cursor.at_keyword("FOREIGN") {
        constraint_name = Some(normalize_identifier(&cursor.ident()?));
    }

    if !(cursor.keyword("FOREIGN") && cursor.keyword("KEY")) {
        return None;
    }
    if !matches!(cursor.peek(), Some(Token::LParen)) {
        // MySQL allows naming the backing index here
        cursor.ident()?;
    }
    let columns = identifier_list(cursor.group()?);

    if !cursor.keyword("REFERENCES") {
        return None;
    }
    let (ref_table, ref_columns) = parse_reference(&mut cursor)?;

    Some(ForeignKey {
        columns,
        ref_table,
        ref_columns,
        constraint_name,
    })
}

/// `table[.table] (cols)` following `REFERENCES`.
fn parse_reference(cursor: &mut Cursor<'_>) -> Option<(String, Vec<String>)> {
    let mut table = cursor.ident()?;
    if matches!(cursor.peek(), Some(Token::Dot)) {
        cursor.advance();
        table = cursor.ident()?;
    }
    let columns = identifier_list(cursor.group()?);
    Some((normalize_identifier(&table), columns))
}

/// `CONSTRAINT name PRIMARY KEY (...)` and named metadata constraints.
fn parse_named_constraint(mut cursor: Cursor<'_>) -> Option<Definition> {
    cursor.keyword("CONSTRAINT");
    if !cursor.at_keywords(&["PRIMARY", "KEY"])
        && !IGNORED_STARTERS.iter().any(|kw| cursor.at_keyword(kw))
    {
        cursor.ident()?;
    }

    if cursor.at_keywords(&["PRIMARY", "KEY"]) {
        Some(Definition::PrimaryKey(primary_key_columns(cursor)))
    } else if IGNORED_STARTERS.iter().any(|kw| cursor.at_keyword(kw)) {
        Some(Definition::Constraint)
    } else {
        None
    }
}

/// `name type [constraints...]`; the type must start with a known type name
/// or a sized word such as `CUSTOM(8)`.
///
/// Columns whose type is neither (`x NUMBER`, `x CITEXT`) and names that are
/// not plain identifiers, quoted or not (`` `user id` ``), are not columns:
/// they end up as unrecognized-definition warnings.
fn parse_column(mut cursor: Cursor<'_>) -> Option<ColumnDef> {
    let name_token = cursor.current()?;
    let raw_name = match &name_token.token {
        Token::Word(w) | Token::Quoted(w) if is_plain_identifier(w) => w.clone(),
        _ => return None,
    };
    cursor.advance();

    let tail = &cursor.src[name_token.end..];
    if !tail.starts_with(char::is_whitespace) || tail.trim().is_empty() {
        return None;
    }

    let name = normalize_identifier(&raw_name);
    if name.is_empty() || !starts_type(&cursor) {
        return None;
    }

    let upper = cursor.src.to_uppercase();
    let mut primary = false;
    let mut references = None;

    while let Some(tok) = cursor.current() {
        if cursor.at_keywords(&["PRIMARY", "KEY"]) {
            primary = true;
        }
        if references.is_none() && tok.is_keyword("REFERENCES") {
            let mut probe = cursor.clone();
            probe.advance();
            if let Some((ref_table, ref_columns)) = parse_reference(&mut probe) {
                references = Some(ForeignKey {
                    columns: vec![name.clone()],
                    ref_table,
                    ref_columns,
                    constraint_name: None,
                });
            }
        }
        cursor.advance();
    }

    Some(ColumnDef {
        column: Column {
            name,
            declared_type: extract_column_type(tail),
            nullable: !upper.contains("NOT NULL"),
        },
        primary,
        references,
    })
}

/// `[A-Za-z_][A-Za-z0-9_$]*`
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn starts_type(cursor: &Cursor<'_>) -> bool {
    let Some(Token::Word(word)) = cursor.peek() else {
        return false;
    };
    if is_type_name(word) {
        return true;
    }
    let mut next = cursor.clone();
    next.advance();
    next.current()
        .zip(cursor.current())
        .is_some_and(|(paren, word)| paren.token == Token::LParen && paren.start == word.end)
}

fn identifier_list(text: &str) -> Vec<String> {
    split_top_level(text, ',')
        .iter()
        .map(|part| normalize_identifier(part))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Recursive-descent position over a definition's tokens.
#[derive(Clone)]
struct Cursor<'a> {
    src: &'a str,
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, tokens: &'a [Spanned]) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
        }
    }

    fn current(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.current().map(|t| &t.token)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.current().is_some_and(|t| t.is_keyword(keyword))
    }

    fn at_keywords(&self, keywords: &[&str]) -> bool {
        keywords.iter().enumerate().all(|(i, kw)| {
            self.tokens
                .get(self.pos + i)
                .is_some_and(|t| t.is_keyword(kw))
        })
    }

    /// Consume `keyword` if it is next.
    fn keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        let name = match self.peek()? {
            Token::Word(w) | Token::Quoted(w) => w.clone(),
            _ => return None,
        };
        self.advance();
        Some(name)
    }

    /// Consume a balanced `( ... )` group and return the text inside it.
    fn group(&mut self) -> Option<&'a str> {
        let open = self.current()?;
        if open.token != Token::LParen {
            return None;
        }
        let mut depth = 0usize;
        while let Some(tok) = self.current() {
            self.advance();
            match tok.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&self.src[open.end..tok.start]);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(def: &str) -> ColumnDef {
        match classify(def) {
            Definition::Column(c) => c,
            other => panic!("expected column, got {:?}", other),
        }
    }

    #[test]
    fn test_scenario_single_table() {
        let schema =
            parse_schema("CREATE TABLE users (id INT NOT NULL, name VARCHAR(50), PRIMARY KEY (id));");
        assert!(schema.warnings.is_empty());
        assert_eq!(schema.tables.len(), 1);

        let users = &schema.tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.primary_keys.iter().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(users.columns[0].name, "id");
        assert!(!users.columns[0].nullable);
        assert_eq!(users.columns[1].name, "name");
        assert_eq!(users.columns[1].declared_type, "VARCHAR(50)");
        assert!(users.columns[1].nullable);
    }

    #[test]
    fn test_classify_column_with_inline_constraints() {
        let def = column("`id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY");
        assert_eq!(def.column.name, "id");
        assert_eq!(def.column.declared_type, "BIGINT UNSIGNED");
        assert!(!def.column.nullable);
        assert!(def.primary);
        assert!(def.references.is_none());
    }

    #[test]
    fn test_classify_inline_reference() {
        let def = column("owner_id INT NOT NULL REFERENCES `app`.`users` (`id`) ON DELETE CASCADE");
        let fk = def.references.expect("inline foreign key");
        assert_eq!(fk.columns, vec!["owner_id"]);
        assert_eq!(fk.ref_table, "users");
        assert_eq!(fk.ref_columns, vec!["id"]);
        assert_eq!(fk.constraint_name, None);
    }

    #[test]
    fn test_classify_table_foreign_key() {
        let def = "CONSTRAINT `fk_line_order`\n FOREIGN KEY (`order_id`, `shop_id`)\n REFERENCES orders(id, shop_id)";
        match classify(def) {
            Definition::ForeignKey(fk) => {
                assert_eq!(fk.columns, vec!["order_id", "shop_id"]);
                assert_eq!(fk.ref_table, "orders");
                assert_eq!(fk.ref_columns, vec!["id", "shop_id"]);
                assert_eq!(fk.constraint_name.as_deref(), Some("fk_line_order"));
            }
            other => panic!("expected foreign key, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_foreign_key_with_index_name() {
        match classify("foreign key idx_user (user_id) references users (id)") {
            Definition::ForeignKey(fk) => assert_eq!(fk.columns, vec!["user_id"]),
            other => panic!("expected foreign key, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_metadata_is_ignored() {
        for def in [
            "INDEX idx_name (name)",
            "KEY idx_created (created_at)",
            "UNIQUE KEY uq_email (email)",
            "CHECK (price > 0)",
            "FULLTEXT KEY ft_body (body)",
            "SPATIAL INDEX sp_geo (geo)",
            "CONSTRAINT uq_sku UNIQUE (sku)",
        ] {
            assert_eq!(classify(def), Definition::Constraint, "{}", def);
        }
    }

    #[test]
    fn test_classify_named_primary_key() {
        assert_eq!(
            classify("CONSTRAINT pk_items PRIMARY KEY (order_id, line_no)"),
            Definition::PrimaryKey(vec!["order_id".into(), "line_no".into()])
        );
    }

    #[test]
    fn test_keyword_prefixed_column_names() {
        assert_eq!(column("key_name VARCHAR(20)").column.name, "key_name");
        assert_eq!(column("index_no INT").column.name, "index_no");
        assert_eq!(column("`key` INT").column.name, "key");
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(
            classify("FOOBAR weird syntax"),
            Definition::Unrecognized("FOOBAR weird syntax".into())
        );
        assert!(matches!(classify("FOREIGN KEY broken"), Definition::Unrecognized(_)));
        assert!(matches!(classify("42 INT"), Definition::Unrecognized(_)));
        assert!(matches!(classify("lonely"), Definition::Unrecognized(_)));
    }

    #[test]
    fn test_sized_custom_type_is_a_column() {
        let def = column("code CUSTOM(8) NOT NULL");
        assert_eq!(def.column.declared_type, "CUSTOM(8)");
    }

    #[test]
    fn test_foobar_line_warns_and_parsing_continues() {
        let sql = "CREATE TABLE t (id INT,\n FOOBAR weird syntax,\n name TEXT);";
        let schema = parse_schema(sql);
        assert_eq!(schema.warnings.len(), 1);
        assert!(schema.warnings[0].contains("FOOBAR weird syntax"));
        let names: Vec<&str> = schema.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_unrecognized_warning_does_not_stop_parsing() {
        let sql = "CREATE TABLE t (id INT, FOREIGN KEY oops, name TEXT, PRIMARY KEY (id));";
        let schema = parse_schema(sql);
        assert_eq!(schema.warnings.len(), 1);
        assert!(schema.warnings[0].contains("FOREIGN KEY oops"));
        let names: Vec<&str> = schema.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_warning_is_truncated() {
        let long = format!("FOREIGN KEY {}", "x".repeat(300));
        let schema = parse_schema(&format!("CREATE TABLE t (id INT, {long});"));
        assert_eq!(schema.warnings.len(), 1);
        let quoted = schema.warnings[0].trim_start_matches("unrecognized definition: ");
        assert_eq!(quoted.chars().count(), 120);
    }

    #[test]
    fn test_index_line_produces_nothing() {
        let schema = parse_schema("CREATE TABLE t (id INT, name TEXT, INDEX idx_name (name));");
        assert!(schema.warnings.is_empty());
        assert_eq!(schema.tables[0].columns.len(), 2);
        assert!(schema.tables[0].foreign_keys.is_empty());
    }

    #[test]
    fn test_repeated_tables_accumulate() {
        let sql = "CREATE TABLE a (id INT);\n\
                   CREATE TABLE b (id INT);\n\
                   CREATE TABLE IF NOT EXISTS a (extra INT, PRIMARY KEY (id));";
        let schema = parse_schema(sql);
        assert_eq!(schema.tables.len(), 2);
        let a = &schema.tables[0];
        assert_eq!(a.name, "a");
        let names: Vec<&str> = a.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "extra"]);
        assert!(a.is_primary("id"));
    }

    #[test]
    fn test_undeclared_columns_are_dropped_with_warning() {
        let sql = "CREATE TABLE t (id INT, PRIMARY KEY (id, ghost), FOREIGN KEY (nope) REFERENCES u(id));";
        let schema = parse_schema(sql);
        let t = &schema.tables[0];
        assert_eq!(t.primary_keys.len(), 1);
        assert!(t.foreign_keys.is_empty());
        assert_eq!(schema.warnings.len(), 2);
    }

    #[test]
    fn test_key_columns_match_declared_spelling() {
        let sql = "CREATE TABLE users (Id INT PRIMARY KEY);\
                   CREATE TABLE orders (id INT, UserId INT, PRIMARY KEY (ID),\
                   FOREIGN KEY (userid) REFERENCES users(id));";
        let schema = parse_schema(sql);
        assert!(schema.warnings.is_empty(), "{:?}", schema.warnings);

        let orders = &schema.tables[1];
        assert!(orders.is_primary("id"));
        assert_eq!(orders.foreign_keys.len(), 1);
        assert_eq!(orders.foreign_keys[0].columns, vec!["UserId"]);
        assert!(orders.foreign_key_columns().contains("UserId"));
    }

    #[test]
    fn test_column_names_must_be_plain_identifiers() {
        let sql = "CREATE TABLE t (id INT, `user id` INT, `a\"b` INT REFERENCES t(id), `ok$1` INT);";
        let schema = parse_schema(sql);
        assert_eq!(schema.warnings.len(), 2);
        assert!(schema.warnings[0].contains("`user id` INT"));

        let t = &schema.tables[0];
        let names: Vec<&str> = t.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "ok$1"]);
        assert!(t.foreign_keys.is_empty());
    }

    #[test]
    fn test_unlisted_unsized_type_warns() {
        assert!(matches!(classify("x CITEXT"), Definition::Unrecognized(_)));
        assert!(matches!(classify("`é` INT"), Definition::Unrecognized(_)));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let sql = "CREATE TABLE users (id INT PRIMARY KEY);\
                   CREATE TABLE orders (id INT, user_id INT REFERENCES users(id), bad stuff here, ???);";
        assert_eq!(parse_schema(sql), parse_schema(sql));
    }

    #[test]
    fn test_empty_input() {
        let schema = parse_schema("");
        assert!(schema.tables.is_empty());
        assert!(schema.warnings.is_empty());
    }
}
