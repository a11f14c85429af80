//! Markdown 表格渲染

use serde_json::Value;

use crate::models::Row;

/// 空数据时的占位文本
pub const EMPTY_TABLE: &str = "暂无数据";

/// 将行数据渲染为 Markdown 表格
///
/// 表头取第一行的字段顺序；其他行缺失的字段留空。
pub fn format_list_to_markdown_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return EMPTY_TABLE.to_string();
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(format!(
        "| {} |",
        headers.iter().map(|h| escape_cell(h)).collect::<Vec<_>>().join(" | ")
    ));
    lines.push(format!("|{}", " --- |".repeat(headers.len())));

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h.as_str()).map(cell_text).unwrap_or_default())
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape_cell(s),
        other => escape_cell(&other.to_string()),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_table_keeps_column_order() {
        let rows = vec![
            row(json!({"日期": "2024-01-05", "收盘": "158.50", "成交量": 123456})),
            row(json!({"日期": "2024-01-08", "收盘": "159.00", "成交量": null})),
        ];
        let table = format_list_to_markdown_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "| 日期 | 收盘 | 成交量 |");
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert_eq!(lines[2], "| 2024-01-05 | 158.50 | 123456 |");
        assert_eq!(lines[3], "| 2024-01-08 | 159.00 |  |");
    }

    #[test]
    fn test_table_escapes_pipes_and_newlines() {
        let rows = vec![row(json!({"名称": "A|B", "备注": "第一行\n第二行"}))];
        let table = format_list_to_markdown_table(&rows);
        assert!(table.contains("A\\|B"));
        assert!(table.contains("第一行 第二行"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_list_to_markdown_table(&[]), EMPTY_TABLE);
    }
}
