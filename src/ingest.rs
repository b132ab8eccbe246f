//! Local file staging and preview parsing ahead of upload.
//!
//! Selection is gated on the declared media type (`.csv` or `.tsv`
//! extension); anything else is rejected without touching prior state. A
//! successful selection materializes the header row plus up to five data
//! rows for preview. Parse failures keep the previously staged file and
//! preview intact.

use crate::error::{Result, WorkflowError};

pub const PREVIEW_ROWS: usize = 5;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Header order plus a short row prefix of the selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A locally held file awaiting upload.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub delimiter: u8,
}

/// Resolves the delimiter from the file extension, the same convention the
/// rest of the CSV tooling uses. `None` means the extension does not mark
/// delimited text at all.
pub fn delimiter_for(name: &str) -> Option<u8> {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext)?;
    if extension.eq_ignore_ascii_case("csv") {
        Some(DEFAULT_CSV_DELIMITER)
    } else if extension.eq_ignore_ascii_case("tsv") {
        Some(DEFAULT_TSV_DELIMITER)
    } else {
        None
    }
}

fn parse_preview(bytes: &[u8], delimiter: u8) -> Result<Preview> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(bytes);

    let columns = reader
        .headers()
        .map_err(WorkflowError::PreviewParse)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::with_capacity(PREVIEW_ROWS);
    for record in reader.records().take(PREVIEW_ROWS) {
        let record = record.map_err(WorkflowError::PreviewParse)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Preview { columns, rows })
}

/// Owns the locally held file and its preview. Upload itself goes through
/// the orchestrator's transport; this stage only hands the staged bytes
/// over.
#[derive(Debug, Default)]
pub struct IngestionStage {
    staged: Option<StagedFile>,
    preview: Option<Preview>,
}

impl IngestionStage {
    /// Stages a file and recomputes the preview. Non-CSV names fail with
    /// `NotCsv`, malformed content with `PreviewParse`; either way the
    /// previously staged file and preview survive. A `delimiter` override
    /// replaces the extension-resolved one; the media-type gate still
    /// applies.
    pub fn select_file(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        delimiter: Option<u8>,
    ) -> Result<&Preview> {
        let resolved = delimiter_for(name)
            .ok_or_else(|| WorkflowError::NotCsv(name.to_string()))?;
        let delimiter = delimiter.unwrap_or(resolved);
        let preview = parse_preview(&bytes, delimiter)?;
        self.staged = Some(StagedFile {
            name: name.to_string(),
            bytes,
            delimiter,
        });
        Ok(&*self.preview.insert(preview))
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.staged.is_some()
    }

    /// Drops the staged file and preview. The orchestrator clears all
    /// derived downstream state alongside this.
    pub fn reset_upload(&mut self) {
        self.staged = None;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_csv_extension_is_rejected_without_touching_state() {
        let mut stage = IngestionStage::default();
        stage
            .select_file("good.csv", b"id,name\n1,a\n".to_vec(), None)
            .expect("select csv");

        let err = stage.select_file("notes.txt", b"id\n1\n".to_vec(), None).unwrap_err();
        assert!(matches!(err, WorkflowError::NotCsv(_)));
        assert_eq!(stage.staged().map(|f| f.name.as_str()), Some("good.csv"));
        assert!(stage.preview().is_some());
    }

    #[test]
    fn preview_is_a_prefix_of_at_most_five_rows() {
        let mut stage = IngestionStage::default();
        let mut data = String::from("id,name\n");
        for i in 0..8 {
            data.push_str(&format!("{i},row{i}\n"));
        }
        let preview = stage.select_file("data.csv", data.into_bytes(), None).expect("select");

        assert_eq!(preview.columns, vec!["id", "name"]);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.rows[0], vec!["0", "row0"]);
    }

    #[test]
    fn short_files_preview_fewer_rows() {
        let mut stage = IngestionStage::default();
        let preview = stage
            .select_file("tiny.csv", b"a,b\n1,2\n".to_vec(), None)
            .expect("select");
        assert_eq!(preview.rows.len(), 1);
    }

    #[test]
    fn malformed_rows_keep_the_previous_preview() {
        let mut stage = IngestionStage::default();
        stage
            .select_file("good.csv", b"id,name\n1,a\n".to_vec(), None)
            .expect("select csv");

        // Second data row has an extra field; non-flexible readers reject it.
        let err = stage
            .select_file("bad.csv", b"id,name\n1,a\n2,b,c\n".to_vec(), None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::PreviewParse(_)));
        assert_eq!(stage.staged().map(|f| f.name.as_str()), Some("good.csv"));
        assert_eq!(stage.preview().map(|p| p.rows.len()), Some(1));
    }

    #[test]
    fn delimiter_override_replaces_the_extension_default() {
        let mut stage = IngestionStage::default();
        let preview = stage
            .select_file("semi.csv", b"id;name\n1;a\n".to_vec(), Some(b';'))
            .expect("select with override");
        assert_eq!(preview.columns, vec!["id", "name"]);
        assert_eq!(preview.rows[0], vec!["1", "a"]);
        assert_eq!(stage.staged().map(|f| f.delimiter), Some(b';'));

        // The media-type gate still applies even with an explicit delimiter.
        let err = stage
            .select_file("semi.dat", b"id;name\n1;a\n".to_vec(), Some(b';'))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotCsv(_)));
    }

    #[test]
    fn tsv_files_resolve_a_tab_delimiter() {
        let mut stage = IngestionStage::default();
        let preview = stage
            .select_file("data.tsv", b"id\tname\n1\ta\n".to_vec(), None)
            .expect("select tsv");
        assert_eq!(preview.columns, vec!["id", "name"]);
        assert_eq!(stage.staged().map(|f| f.delimiter), Some(b'\t'));
    }
}
