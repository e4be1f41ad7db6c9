use chrono::NaiveDate;
use khata_core::{BankInfo, Money, TransactionType};
use khata_import::{hash, ProcessingOptions, StatementProcessor, Workbook};

const HDFC_XLSX: &[u8] = include_bytes!("fixtures/hdfc_statement.xlsx");

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn decodes_sheets_in_workbook_order() {
    let workbook = Workbook::from_bytes(HDFC_XLSX).unwrap();
    let names: Vec<&str> = workbook.sheets().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Statement", "Summary"]);

    let statement = workbook.first_sheet().unwrap();
    assert_eq!(statement.rows.len(), 5);
    assert_eq!(statement.rows[0][1], "Narration");
    // Typed date cell renders as ISO, numeric cells without trailing zeros.
    assert_eq!(statement.rows[2][0], "2024-01-15");
    assert_eq!(statement.rows[2][3], "250.5");
    assert_eq!(statement.rows[2][4], "");
    assert_eq!(statement.rows[3][0], "16/01/24 10:30");
    assert_eq!(statement.rows[3][4], "50000");
}

#[test]
fn processes_hdfc_workbook_end_to_end() {
    let result = StatementProcessor::default().process(HDFC_XLSX, "user-1", &ProcessingOptions::default());

    assert!(result.success, "errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    assert_eq!(result.bank_info, BankInfo::new("HDFC Bank", "HDFC"));
    assert_eq!(result.total_transactions, 3);
    assert_eq!(result.processed_transactions, 3);
    assert_eq!(result.failed_transactions, 0);
    assert_eq!(
        result.source_sha256.as_deref(),
        Some(hash::statement_digest(HDFC_XLSX).as_str())
    );

    let swiggy = &result.transactions[0];
    assert_eq!(swiggy.date, d(2024, 1, 15));
    assert_eq!(swiggy.amount, Money::from_paise(250_50));
    assert_eq!(swiggy.transaction_type, TransactionType::Debit);
    assert_eq!(swiggy.balance, Some(Money::from_paise(9_749_50)));
    assert_eq!(swiggy.reference.as_deref(), Some("R1"));
    assert_eq!(swiggy.vendor.as_deref(), Some("Swiggy"));

    let salary = &result.transactions[1];
    assert_eq!(salary.date, d(2024, 1, 16));
    assert_eq!(salary.amount, Money::from_paise(50_000_00));
    assert_eq!(salary.transaction_type, TransactionType::Credit);
    assert_eq!(salary.category.as_deref(), Some("Income"));

    let unknown = &result.transactions[2];
    assert_eq!(unknown.date, d(2024, 1, 17));
    assert_eq!(unknown.amount, Money::from_paise(10_00));
    assert_eq!(unknown.category.as_deref(), Some("Other"));
}

#[test]
fn fixture_passes_admission_checks() {
    StatementProcessor::default()
        .validate_file("hdfc_statement.xlsx", HDFC_XLSX)
        .unwrap();
}
