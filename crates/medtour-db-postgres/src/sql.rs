//! Translation of storage filters into SQL `WHERE` clauses.
//!
//! Every value is bound as a text parameter; only field names (validated as
//! identifiers) are spliced into the statement.

use medtour_storage::{Filter, StorageError};

use crate::schema::SchemaManager;

/// A `WHERE` clause and its positional text parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WhereClause {
    pub sql: String,
    pub binds: Vec<String>,
}

/// Builds a `WHERE` clause whose placeholders start after `first_param - 1`.
pub(crate) fn where_clause(
    filter: Option<&Filter>,
    first_param: usize,
) -> Result<WhereClause, StorageError> {
    let mut binds = Vec::new();
    let sql = match filter {
        Some(filter) => render(filter, first_param, &mut binds)?,
        None => "TRUE".to_string(),
    };
    Ok(WhereClause { sql, binds })
}

fn render(filter: &Filter, first: usize, binds: &mut Vec<String>) -> Result<String, StorageError> {
    for field in filter.fields() {
        if !SchemaManager::is_valid_identifier(field) {
            return Err(StorageError::invalid_document(format!(
                "invalid filter field: {field}"
            )));
        }
    }

    let param = |value: String, binds: &mut Vec<String>| {
        binds.push(value);
        format!("${}", first + binds.len() - 1)
    };

    Ok(match filter {
        Filter::Contains { fields, needle } => {
            if fields.is_empty() {
                return Ok("FALSE".to_string());
            }
            let p = param(format!("%{}%", escape_like(needle)), binds);
            let parts: Vec<String> = fields
                .iter()
                .map(|f| {
                    format!(
                        "EXISTS (SELECT 1 FROM jsonb_array_elements_text(CASE jsonb_typeof(doc->'{f}') \
                         WHEN 'array' THEN doc->'{f}' \
                         WHEN 'string' THEN jsonb_build_array(doc->'{f}') \
                         ELSE '[]'::jsonb END) AS e(v) WHERE e.v ILIKE {p} ESCAPE '\\')"
                    )
                })
                .collect();
            format!("({})", parts.join(" OR "))
        }
        Filter::Equals { field, value } => {
            let p = param(value.clone(), binds);
            format!("(doc->>'{field}' = {p})")
        }
        Filter::Between { field, from, to } => {
            let lo = param(from.clone(), binds);
            let hi = param(to.clone(), binds);
            format!(
                r#"((doc->>'{field}') COLLATE "C" >= {lo} AND (doc->>'{field}') COLLATE "C" <= {hi})"#
            )
        }
        Filter::All(filters) => {
            if filters.is_empty() {
                return Ok("TRUE".to_string());
            }
            let mut parts = Vec::with_capacity(filters.len());
            for f in filters {
                parts.push(render(f, first, binds)?);
            }
            format!("({})", parts.join(" AND "))
        }
    })
}

/// Escapes `LIKE` metacharacters using backslash as the escape character.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
