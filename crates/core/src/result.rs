use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::{BankInfo, CanonicalTransaction};

/// Outcome of processing one statement workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub success: bool,
    pub total_transactions: usize,
    pub processed_transactions: usize,
    pub failed_transactions: usize,
    pub transactions: Vec<CanonicalTransaction>,
    pub errors: Vec<String>,
    pub bank_info: BankInfo,
    /// Wall-clock time spent, in milliseconds.
    pub processing_time: u64,
    /// SHA-256 of the input bytes, when the run started from raw bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
}

impl ProcessingResult {
    /// A run that aborted before any row was looked at.
    pub fn aborted(message: impl Into<String>, processing_time: u64) -> Self {
        ProcessingResult {
            success: false,
            total_transactions: 0,
            processed_transactions: 0,
            failed_transactions: 0,
            transactions: Vec::new(),
            errors: vec![message.into()],
            bank_info: BankInfo::unknown(),
            processing_time,
            source_sha256: None,
        }
    }

    /// Errors flattened the way the processing log stores them.
    pub fn joined_errors(&self) -> String {
        self.errors.join("; ")
    }
}

/// One audit record per processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingLog {
    pub id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub bank_name: String,
    pub bank_code: String,
    pub total_transactions: usize,
    pub processed_transactions: usize,
    pub failed_transactions: usize,
    pub processing_time: u64,
    pub errors: String,
    pub source_sha256: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProcessingLog {
    pub fn from_result(result: &ProcessingResult, user_id: &str, file_name: &str) -> Self {
        ProcessingLog {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            bank_name: result.bank_info.bank_name.clone(),
            bank_code: result.bank_info.bank_code.clone(),
            total_transactions: result.total_transactions,
            processed_transactions: result.processed_transactions,
            failed_transactions: result.failed_transactions,
            processing_time: result.processing_time,
            errors: result.joined_errors(),
            source_sha256: result.source_sha256.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_result_has_single_error_and_unknown_bank() {
        let r = ProcessingResult::aborted("Excel file is empty", 3);
        assert!(!r.success);
        assert_eq!(r.errors, vec!["Excel file is empty".to_string()]);
        assert_eq!(r.bank_info, BankInfo::unknown());
        assert!(r.transactions.is_empty());
        assert_eq!(r.total_transactions, 0);
    }

    #[test]
    fn log_joins_errors_with_semicolons() {
        let mut r = ProcessingResult::aborted("Row 3: bad date", 12);
        r.errors.push("Row 7: bad date".to_string());
        r.bank_info = BankInfo::new("HDFC Bank", "HDFC");
        let log = ProcessingLog::from_result(&r, "user-1", "statement.xlsx");
        assert_eq!(log.errors, "Row 3: bad date; Row 7: bad date");
        assert_eq!(log.bank_code, "HDFC");
        assert_eq!(log.file_name, "statement.xlsx");
        assert_eq!(log.processing_time, 12);
    }

    #[test]
    fn result_serializes_camel_case() {
        let r = ProcessingResult::aborted("x", 0);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["bankInfo"]["bankCode"], "UNKNOWN");
        assert_eq!(json["totalTransactions"], 0);
        assert!(json.get("sourceSha256").is_none());
    }
}
