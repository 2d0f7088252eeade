//! Quoted comma-separated tables (`.au`, `.des`, `.cst`).
//!
//! The first row names the columns. Fields may be wrapped in double quotes;
//! inside quotes a doubled quote stands for one quote and commas and line
//! breaks are literal. Whitespace around fields is trimmed.

use crate::common::error::{ParseError, ParseResult};

/// A table with lowercase column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Index of a column, by case-insensitive name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Rows as (header, value) lookups.
    pub fn records(&self) -> impl Iterator<Item = CsvRecord<'_>> {
        self.rows.iter().map(move |row| CsvRecord { table: self, row })
    }
}

/// One row of a [`CsvTable`].
#[derive(Debug, Clone, Copy)]
pub struct CsvRecord<'a> {
    table: &'a CsvTable,
    row: &'a [String],
}

impl<'a> CsvRecord<'a> {
    /// Value of a column; `None` when the column or the cell is missing or empty.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.table.column(column)?;
        self.row
            .get(index)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All non-empty values of the columns at and after `first`.
    pub fn values_from(&self, first: usize) -> impl Iterator<Item = &'a str> {
        self.row
            .iter()
            .skip(first)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Parse `text`; `file` names the source in errors.
pub fn parse_table(text: &str, file: &str) -> ParseResult<CsvTable> {
    let mut rows = parse_rows(text, file)?.into_iter();
    let headers = rows
        .next()
        .map(|header| header.into_iter().map(|h| h.to_ascii_lowercase()).collect())
        .unwrap_or_default();
    Ok(CsvTable {
        headers,
        rows: rows.collect(),
    })
}

fn parse_rows(text: &str, file: &str) -> ParseResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut quote_line = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                line += 1;
                if in_quotes {
                    current.push(ch);
                } else {
                    finish_field(&mut current, &mut fields);
                    finish_row(&mut fields, &mut rows);
                }
            },
            // CRLF: the LF ends the line.
            '\r' if !in_quotes => {},
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        // Doubled quote is an escaped quote.
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                    quote_line = line;
                }
            },
            ',' if !in_quotes => finish_field(&mut current, &mut fields),
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(ParseError::format(
            file,
            format!("line {}", quote_line),
            "unterminated quoted field",
        ));
    }
    if !current.is_empty() || !fields.is_empty() {
        finish_field(&mut current, &mut fields);
        finish_row(&mut fields, &mut rows);
    }
    Ok(rows)
}

fn finish_field(current: &mut String, fields: &mut Vec<String>) {
    let field = std::mem::take(current);
    fields.push(field.trim().to_string());
}

/// Blank lines produce no row.
fn finish_row(fields: &mut Vec<String>, rows: &mut Vec<Vec<String>>) {
    let row = std::mem::take(fields);
    if row.iter().any(|f| !f.is_empty()) {
        rows.push(row);
    }
}
