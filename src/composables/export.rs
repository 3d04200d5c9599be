//! 报表导出 (CSV / JSON)

use giftdesk_shared::{Date, ReportRow};
use serde_json::Value;

/// 导出列：`key` 取行字段，`title` 写入表头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub title: String,
}

impl Column {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Json => "application/json;charset=utf-8;",
        }
    }
}

/// `<name>_<YYYYMMDD_HHMM>.<ext>`，时间取本地时区
pub fn export_file_name(name: &str, format: ExportFormat, at: &Date) -> String {
    format!("{}_{}.{}", name, at.file_stamp(), format.extension())
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '\n', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn to_csv(rows: &[ReportRow], columns: &[Column]) -> String {
    let header = columns
        .iter()
        .map(|c| escape_csv(&c.title))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        let line = columns
            .iter()
            .map(|c| escape_csv(&cell_text(row.get(&c.key))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

pub fn to_json(rows: &[ReportRow]) -> Result<String, String> {
    serde_json::to_string_pretty(rows).map_err(|e| format!("Failed to export data to JSON: {e}"))
}

/// 按格式渲染内容，返回 (文件名, MIME, 内容)
pub fn render(
    rows: &[ReportRow],
    columns: &[Column],
    format: ExportFormat,
    name: &str,
    at: &Date,
) -> Result<(String, &'static str, String), String> {
    let body = match format {
        ExportFormat::Csv => to_csv(rows, columns),
        ExportFormat::Json => to_json(rows)?,
    };
    Ok((export_file_name(name, format, at), format.mime_type(), body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftdesk_shared::Timestamp;
    use serde_json::json;

    fn row(value: Value) -> ReportRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn csv_escapes_and_blanks() {
        let rows = vec![
            row(json!({ "gift": "Vase, blue", "qty": 2, "note": null })),
            row(json!({ "gift": "Say \"hi\"", "qty": 1, "note": "line1\nline2" })),
        ];
        let columns = vec![
            Column::new("gift", "Gift"),
            Column::new("qty", "Qty"),
            Column::new("note", "Note"),
            Column::new("missing", "Missing"),
        ];

        let csv = to_csv(&rows, &columns);
        assert_eq!(
            csv,
            "Gift,Qty,Note,Missing\n\"Vase, blue\",2,,\n\"Say \"\"hi\"\"\",1,\"line1\nline2\","
        );
    }

    #[test]
    fn json_is_pretty() {
        let rows = vec![row(json!({ "a": 1 }))];
        assert_eq!(to_json(&rows).unwrap(), "[\n  {\n    \"a\": 1\n  }\n]");
    }

    #[test]
    fn file_name_and_mime() {
        let at = Date::from_timestamp(Timestamp::new(1_700_000_000_000)).unwrap();
        let (name, mime, _) = render(&[], &[], ExportFormat::Csv, "dispatched-gifts", &at).unwrap();
        assert_eq!(name, format!("dispatched-gifts_{}.csv", at.file_stamp()));
        assert_eq!(mime, "text/csv;charset=utf-8;");
        assert_eq!(ExportFormat::Json.extension(), "json");
    }
}
