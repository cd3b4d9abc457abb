//! MySQL `CREATE TABLE` dump to schema model.

mod extract;
mod lexer;
mod parser;
mod types;

pub use extract::{extract_create_table_blocks, normalize_identifier, TableBlock};
pub use lexer::{split_top_level, strip_comments};
pub use parser::{classify, parse_schema, ColumnDef, Definition};
pub use types::{diagram_type, extract_column_type};
