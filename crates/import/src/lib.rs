pub mod catalog;
pub mod default_rules;
pub mod detect;
pub mod hash;
pub mod normalize;
pub mod pipeline;
pub mod row;
pub mod rules;
pub mod workbook;

pub use catalog::{BankFormatSpec, CatalogEntry, CatalogError, ColumnMap, ColumnRef, Detection, FormatCatalog};
pub use detect::detect_bank;
pub use normalize::{normalize_amount, normalize_date, DateParseError};
pub use pipeline::{PipelineError, ProcessingOptions, StatementProcessor, MAX_FILE_SIZE};
pub use row::{parse_row, ColumnIndexMap, RowError};
pub use rules::{AmountRange, CategoryGroup, CategoryRule, Categorizer, RuleError, VendorRule};
pub use workbook::{Sheet, Workbook, WorkbookError};

pub mod ingest {
    use crate::*;
    use khata_core::{Categorization, Money, ProcessingResult, TransactionType};
    use std::sync::OnceLock;

    static DEFAULT_PROCESSOR: OnceLock<StatementProcessor> = OnceLock::new();

    /// Processor over the built-in bank catalog and rule tables, built on
    /// first use and shared afterwards.
    pub fn default_processor() -> &'static StatementProcessor {
        DEFAULT_PROCESSOR.get_or_init(StatementProcessor::default)
    }

    pub fn process_statement(bytes: &[u8], user_id: &str) -> ProcessingResult {
        default_processor().process(bytes, user_id, &ProcessingOptions::default())
    }

    pub fn categorize_description(
        description: &str,
        amount: Money,
        transaction_type: TransactionType,
    ) -> Categorization {
        default_processor()
            .categorizer()
            .categorize(description, amount, transaction_type)
    }

    pub fn load_catalog(toml_content: &str) -> Result<FormatCatalog, CatalogError> {
        FormatCatalog::from_toml(toml_content)
    }

    pub fn load_rules(toml_content: &str) -> Result<Categorizer, RuleError> {
        Categorizer::from_toml(toml_content)
    }

}
