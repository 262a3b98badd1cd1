//! History export serialization

use crate::history::HistoryRecord;
use anyhow::{Context, Result};

/// UTF-8 byte-order marker so non-ASCII text opens correctly in common
/// spreadsheet tools.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Serialize a snapshot of the log, most recent first
pub fn export<'a, I>(records: I, format: ExportFormat) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    match format {
        ExportFormat::Json => to_json(records),
        ExportFormat::Csv => to_csv(records),
    }
}

fn to_json<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    let records: Vec<&HistoryRecord> = records.into_iter().collect();
    serde_json::to_vec_pretty(&records).context("Failed to serialize history to JSON")
}

fn to_csv<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    let mut buf = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::WriterBuilder::new().from_writer(&mut buf);
        writer
            .write_record([
                "date",
                "time",
                "type",
                "original_text",
                "result_text",
                "tools_used",
                "changes",
            ])
            .context("Failed to write CSV header")?;

        for record in records {
            let changes = record
                .changes
                .iter()
                .map(|c| format!("{} → {} ({})", c.original, c.corrected, c.reason))
                .collect::<Vec<_>>()
                .join("; ");

            writer
                .write_record([
                    record.timestamp.format("%Y-%m-%d").to_string(),
                    record.timestamp.format("%H:%M:%S").to_string(),
                    record.label.clone(),
                    record.original_text.clone(),
                    record.result_text.clone(),
                    record.tools_used.clone(),
                    changes,
                ])
                .context("Failed to write CSV record")?;
        }

        writer.flush().context("Failed to flush CSV output")?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ChangeEntry;

    fn sample_record() -> HistoryRecord {
        HistoryRecord::new(
            "Grammar".to_string(),
            "teh cat, sat".to_string(),
            "the cat sat\non a mat".to_string(),
            "Trinka".to_string(),
            vec![
                ChangeEntry {
                    original: "teh".to_string(),
                    corrected: "the".to_string(),
                    reason: "spelling".to_string(),
                },
                ChangeEntry {
                    original: "cat,".to_string(),
                    corrected: "cat".to_string(),
                    reason: "punctuation".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_json_export_is_a_record_array() {
        let record = sample_record();
        let bytes = export([&record], ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["label"], "Grammar");
        assert_eq!(parsed[0]["changes"][0]["reason"], "spelling");
    }

    #[test]
    fn test_csv_export_starts_with_bom() {
        let record = sample_record();
        let bytes = export([&record], ExportFormat::Csv).unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    }

    #[test]
    fn test_csv_export_shape() {
        let record = sample_record();
        let bytes = export([&record], ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,time,type,original_text,result_text,tools_used,changes"
        );

        // The embedded comma and newline force quoting of the text
        // fields; the changes are joined with "; ".
        assert!(text.contains(r#""teh cat, sat""#));
        assert!(text.contains("\"the cat sat\non a mat\""));
        assert!(text.contains("teh → the (spelling); cat, → cat (punctuation)"));
    }

    #[test]
    fn test_empty_log_exports() {
        let bytes = export([], ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);

        let bytes = export([], ExportFormat::Json).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap().trim(), "[]");
    }
}
