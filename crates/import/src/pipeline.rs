use chrono::Utc;
use khata_core::{BankInfo, CanonicalTransaction, DateRange, ProcessingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::catalog::{BankFormatSpec, FormatCatalog};
use crate::hash;
use crate::row::{parse_row, ColumnIndexMap};
use crate::rules::Categorizer;
use crate::workbook::{Workbook, WorkbookError};

/// Largest statement accepted by [`StatementProcessor::validate_file`].
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const EXCEL_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Failures that abort a whole run. Row-level problems never surface here;
/// they are collected into [`ProcessingResult::errors`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidFile(String),
    #[error("Excel file is empty")]
    EmptyWorkbook,
    #[error("Sheet \"{0}\" not found in the Excel file")]
    SheetNotFound(String),
    #[error("Unable to detect bank format. Please specify bank configuration.")]
    FormatUndetected,
}

impl From<WorkbookError> for PipelineError {
    fn from(e: WorkbookError) -> Self {
        match e {
            WorkbookError::NoSheets => PipelineError::InvalidFile(e.to_string()),
            WorkbookError::Decode(_) => PipelineError::InvalidFile(format!("Invalid Excel file: {e}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingOptions {
    /// Skips detection and forces this layout.
    pub bank_config: Option<BankFormatSpec>,
    pub auto_detect_bank: bool,
    /// Inclusive; rows outside it are dropped without counting as failures.
    pub date_range: Option<DateRange>,
    pub category_mapping: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        ProcessingOptions {
            bank_config: None,
            auto_detect_bank: true,
            date_range: None,
            category_mapping: true,
        }
    }
}

/// Workbook in, categorized transactions out.
///
/// Holds only shared, immutable tables; clone it freely to process several
/// statements at once.
#[derive(Debug, Clone)]
pub struct StatementProcessor {
    catalog: Arc<FormatCatalog>,
    categorizer: Arc<Categorizer>,
}

impl Default for StatementProcessor {
    fn default() -> Self {
        Self::new(
            Arc::new(FormatCatalog::indian_banks()),
            Arc::new(Categorizer::default()),
        )
    }
}

impl StatementProcessor {
    pub fn new(catalog: Arc<FormatCatalog>, categorizer: Arc<Categorizer>) -> Self {
        Self { catalog, categorizer }
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn supported_banks(&self) -> Vec<&BankFormatSpec> {
        self.catalog.specs().collect()
    }

    /// Admission check run before a statement is accepted for processing.
    pub fn validate_file(&self, file_name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
        let is_excel = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| EXCEL_EXTENSIONS.iter().any(|x| ext.eq_ignore_ascii_case(x)));
        if !is_excel {
            return Err(PipelineError::InvalidFile(
                "File must be an Excel file (.xlsx or .xls)".to_string(),
            ));
        }
        if bytes.len() > MAX_FILE_SIZE {
            return Err(PipelineError::InvalidFile(
                "File size must be less than 10MB".to_string(),
            ));
        }
        Workbook::from_bytes(bytes)?;
        Ok(())
    }

    pub fn process(&self, bytes: &[u8], user_id: &str, options: &ProcessingOptions) -> ProcessingResult {
        let started = Instant::now();
        let outcome = Workbook::from_bytes(bytes)
            .map_err(PipelineError::from)
            .and_then(|workbook| self.run(&workbook, user_id, options));
        let mut result = finish(outcome, started);
        result.source_sha256 = Some(hash::statement_digest(bytes));
        result
    }

    pub fn process_workbook(
        &self,
        workbook: &Workbook,
        user_id: &str,
        options: &ProcessingOptions,
    ) -> ProcessingResult {
        let started = Instant::now();
        finish(self.run(workbook, user_id, options), started)
    }

    fn run(
        &self,
        workbook: &Workbook,
        user_id: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessingResult, PipelineError> {
        let explicit = options.bank_config.as_ref();

        // Only an explicit layout may redirect to a named sheet.
        let sheet = match explicit.and_then(|spec| spec.sheet_name.as_deref()) {
            Some(name) => workbook
                .sheet(name)
                .ok_or_else(|| PipelineError::SheetNotFound(name.to_string()))?,
            None => workbook
                .first_sheet()
                .ok_or_else(|| PipelineError::InvalidFile(WorkbookError::NoSheets.to_string()))?,
        };
        let header = sheet.rows.first().ok_or(PipelineError::EmptyWorkbook)?;

        let spec = match explicit {
            Some(spec) => spec,
            None if options.auto_detect_bank => self
                .catalog
                .detect(header.as_slice())
                .ok_or(PipelineError::FormatUndetected)?,
            None => return Err(PipelineError::FormatUndetected),
        };
        tracing::debug!("Using {} layout on sheet \"{}\"", spec.bank_code, sheet.name);

        let bank = BankInfo::new(&spec.bank_name, &spec.bank_code);
        let columns = ColumnIndexMap::resolve(header.as_slice(), spec);
        if !columns.has_required() {
            tracing::warn!(
                bank = %spec.bank_code,
                "Header has no date or description column; every row will be skipped"
            );
        }
        let data_rows = sheet
            .rows
            .get(spec.skip_rows.saturating_add(1)..)
            .unwrap_or_default();

        let mut transactions = Vec::new();
        let mut errors = Vec::new();
        let mut failed = 0;

        for (i, row) in data_rows.iter().enumerate() {
            let raw = match parse_row(row.as_slice(), &columns, spec) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    let row_number = i.saturating_add(spec.skip_rows).saturating_add(2);
                    tracing::warn!("Row {row_number} rejected: {e}");
                    errors.push(format!("Row {row_number}: {e}"));
                    failed += 1;
                    continue;
                }
            };

            if options.date_range.is_some_and(|range| !range.contains(raw.date)) {
                continue;
            }

            let categorization = options.category_mapping.then(|| {
                self.categorizer
                    .categorize(&raw.description, raw.amount, raw.transaction_type)
            });
            transactions.push(CanonicalTransaction::new(
                raw,
                user_id,
                &bank,
                categorization,
                Utc::now(),
            ));
        }

        tracing::info!(
            bank = %bank.bank_code,
            total = data_rows.len(),
            processed = transactions.len(),
            failed,
            "Statement processed"
        );

        Ok(ProcessingResult {
            success: errors.is_empty() || !transactions.is_empty(),
            total_transactions: data_rows.len(),
            processed_transactions: transactions.len(),
            failed_transactions: failed,
            transactions,
            errors,
            bank_info: bank,
            processing_time: 0,
            source_sha256: None,
        })
    }
}

fn finish(outcome: Result<ProcessingResult, PipelineError>, started: Instant) -> ProcessingResult {
    let elapsed = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(mut result) => {
            result.processing_time = elapsed;
            result
        }
        Err(e) => {
            tracing::warn!("Statement processing aborted: {e}");
            ProcessingResult::aborted(e.to_string(), elapsed)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
