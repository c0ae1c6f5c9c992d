use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use tiku_core::model::{ChoiceOptions, QuestionBank, QuestionBankBuilder};
use tracing::{debug, info, warn};

use crate::repository::{BankSource, StorageError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header of the lookup table's stem column.
pub const LOOKUP_STEM_COLUMN: &str = "题目";
/// Header of the lookup table's answer column.
pub const LOOKUP_ANSWER_COLUMN: &str = "题目的文字答案";

/// File names of the four tables inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankFiles {
    pub lookup: PathBuf,
    pub choice: PathBuf,
    pub fill: PathBuf,
    pub judge: PathBuf,
}

impl BankFiles {
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            lookup: dir.join("题库.csv"),
            choice: dir.join("题库_选择题.csv"),
            fill: dir.join("题库_填空题.csv"),
            judge: dir.join("题库_判断题.csv"),
        }
    }
}

/// Loads a bank from CSV tables.
///
/// The lookup table has a header row; the typed tables are headerless with
/// columns `stem,A,B,C,D,answer,type` (choice) and `stem,answer` (fill, judge).
#[derive(Debug, Clone)]
pub struct CsvBankSource {
    files: BankFiles,
}

impl CsvBankSource {
    #[must_use]
    pub fn new(files: BankFiles) -> Self {
        Self { files }
    }

    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(BankFiles::in_dir(dir))
    }

    #[must_use]
    pub fn files(&self) -> &BankFiles {
        &self.files
    }
}

#[async_trait]
impl BankSource for CsvBankSource {
    async fn load_bank(&self) -> Result<QuestionBank, StorageError> {
        let mut builder = QuestionBank::builder();

        if let Some(bytes) = read_table(&self.files.lookup).await? {
            read_lookup_table(&bytes, &mut builder);
        }
        if let Some(bytes) = read_table(&self.files.choice).await? {
            read_typed_table(&bytes, "choice", |row| {
                let options = ChoiceOptions::new(cell(row, 1), cell(row, 2), cell(row, 3), cell(row, 4));
                let label = cell(row, 6);
                builder.push_choice(row.get(0).unwrap_or_default(), options, cell(row, 5), label.as_deref())
            });
        }
        if let Some(bytes) = read_table(&self.files.fill).await? {
            read_typed_table(&bytes, "fill", |row| {
                builder.push_fill(row.get(0).unwrap_or_default(), cell(row, 1))
            });
        }
        if let Some(bytes) = read_table(&self.files.judge).await? {
            read_typed_table(&bytes, "judge", |row| {
                builder.push_judge(row.get(0).unwrap_or_default(), cell(row, 1))
            });
        }

        let bank = builder.build();
        info!(questions = bank.len(), "question bank loaded");
        Ok(bank)
    }
}

/// Reads a table, `None` when the file does not exist.
async fn read_table(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(mut bytes) => {
            if bytes.starts_with(UTF8_BOM) {
                bytes.drain(..UTF8_BOM.len());
            }
            Ok(Some(bytes))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "table missing, pool left empty");
            Ok(None)
        }
        Err(err) => Err(StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }),
    }
}

fn read_lookup_table(bytes: &[u8], builder: &mut QuestionBankBuilder) {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            warn!(error = %err, "lookup table header unreadable");
            return;
        }
    };
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(stem_col), Some(answer_col)) =
        (position(LOOKUP_STEM_COLUMN), position(LOOKUP_ANSWER_COLUMN))
    else {
        warn!(?headers, "lookup table lacks stem/answer columns");
        return;
    };

    for (row_num, record) in reader.records().enumerate() {
        match record {
            Ok(row) => {
                let stem = row.get(stem_col).unwrap_or_default();
                if builder.push_lookup(stem, cell(&row, answer_col)).is_none() {
                    debug!(row = row_num + 2, "lookup row without stem skipped");
                }
            }
            Err(err) => warn!(row = row_num + 2, error = %err, "lookup row skipped"),
        }
    }
}

fn read_typed_table<F>(bytes: &[u8], table: &str, mut push: F)
where
    F: FnMut(&StringRecord) -> Option<tiku_core::model::QuestionId>,
{
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(bytes);

    for (row_num, record) in reader.records().enumerate() {
        match record {
            Ok(row) => {
                if push(&row).is_none() {
                    warn!(table, row = row_num + 1, "row without stem skipped");
                }
            }
            Err(err) => warn!(table, row = row_num + 1, error = %err, "row skipped"),
        }
    }
}

fn cell(row: &StringRecord, index: usize) -> Option<String> {
    row.get(index).map(str::to_string)
}
