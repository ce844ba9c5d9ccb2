//! Tabular and JSON export of batch results.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::types::document::{ExtractedDocument, PaginatedDocument};
use crate::types::schema::{page_urls, LISTINGS_KEY};

/// One output row, keys in first-seen order.
pub type Row = IndexMap<String, Value>;

fn row_from(value: &Value) -> Row {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        other => Row::from([("value".to_string(), other.clone())]),
    }
}

/// One row per extracted record.
///
/// A `listings` array is flattened one level; any other value is one row.
pub fn extraction_rows(results: &[ExtractedDocument]) -> Vec<Row> {
    let mut rows = Vec::new();
    for result in results {
        match result.parsed_data.get(LISTINGS_KEY) {
            Some(Value::Array(items)) => rows.extend(items.iter().map(row_from)),
            _ => rows.push(row_from(&result.parsed_data)),
        }
    }
    rows
}

/// One `{page_url}` row per discovered URL.
pub fn pagination_rows(results: &[PaginatedDocument]) -> Vec<Row> {
    results
        .iter()
        .flat_map(|r| page_urls(&r.pagination_data))
        .map(|url| Row::from([("page_url".to_string(), Value::String(url))]))
        .collect()
}

/// CSV with `preferred_columns` first, then other keys by first appearance.
pub fn to_csv(rows: &[Row], preferred_columns: &[&str]) -> String {
    let mut columns: IndexSet<String> = preferred_columns.iter().map(|c| c.to_string()).collect();
    for row in rows {
        columns.extend(row.keys().cloned());
    }

    let mut out = String::new();
    write_record(&mut out, columns.iter().map(String::as_str));
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.get(c).map(cell_text).unwrap_or_default())
            .collect();
        write_record(&mut out, cells.iter().map(String::as_str));
    }
    out
}

/// Pretty JSON, one entry per document.
pub fn to_json<T: Serialize>(results: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_record<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        if cell.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extracted(key: &str, data: Value) -> ExtractedDocument {
        ExtractedDocument {
            key: key.into(),
            parsed_data: data,
        }
    }

    #[test]
    fn test_listings_flattened_one_level() {
        let results = vec![
            extracted(
                "a",
                json!({"listings": [{"title": "Loft", "price": "$900"}, {"title": "Studio", "price": "$700"}]}),
            ),
            extracted("b", json!({"raw_text": "unparseable"})),
        ];

        let rows = extraction_rows(&results);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["title"], json!("Studio"));
        assert_eq!(rows[2]["raw_text"], json!("unparseable"));
    }

    #[test]
    fn test_pagination_rows() {
        let results = vec![PaginatedDocument {
            key: "a".into(),
            pagination_data: json!({"page_urls": ["https://a.com/1", "https://a.com/2"]}),
        }];
        let rows = pagination_rows(&results);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["page_url"], json!("https://a.com/2"));
    }

    #[test]
    fn test_csv_column_order_and_quoting() {
        let rows = vec![
            Row::from([
                ("price".to_string(), json!("$1,200")),
                ("title".to_string(), json!("The \"Big\" Loft")),
            ]),
            Row::from([
                ("title".to_string(), json!("Studio")),
                ("beds".to_string(), json!(2)),
            ]),
        ];

        let csv = to_csv(&rows, &["title", "price"]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "title,price,beds");
        assert_eq!(lines[1], "\"The \"\"Big\"\" Loft\",\"$1,200\",");
        assert_eq!(lines[2], "Studio,,2");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_csv_multiline_cell_quoted() {
        let rows = vec![Row::from([("note".to_string(), json!("line one\nline two"))])];
        assert_eq!(to_csv(&rows, &[]), "note\r\n\"line one\nline two\"\r\n");
    }

    #[test]
    fn test_json_preserves_structure() {
        let results = vec![extracted("a", json!({"listings": [{"title": "Loft"}]}))];
        let text = to_json(&results).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!([{"key": "a", "parsed_data": {"listings": [{"title": "Loft"}]}}]));
    }
}
