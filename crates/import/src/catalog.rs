use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a logical field lives in the sheet: a header-name substring
/// (matched case-insensitively) or a literal zero-based column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Header(String),
}

impl ColumnRef {
    fn header(name: &str) -> Self {
        ColumnRef::Header(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub date: ColumnRef,
    pub description: ColumnRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debit: Option<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ColumnRef>,
}

impl ColumnMap {
    /// Configured fields in column order, paired with their logical names.
    pub fn fields(&self) -> Vec<(&'static str, &ColumnRef)> {
        let mut fields = vec![("date", &self.date), ("description", &self.description)];
        let optional = [
            ("debit", &self.debit),
            ("credit", &self.credit),
            ("amount", &self.amount),
            ("balance", &self.balance),
            ("reference", &self.reference),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, col)| col.as_ref().map(|c| (name, c))),
        );
        fields
    }
}

/// Column layout and date convention of one bank's statement export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankFormatSpec {
    pub bank_name: String,
    pub bank_code: String,
    pub columns: ColumnMap,
    pub date_format: String,
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

impl BankFormatSpec {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.bank_code.trim().is_empty() {
            return Err(CatalogError::Invalid {
                bank: self.bank_name.clone(),
                reason: "bank code is empty".to_string(),
            });
        }
        let cols = &self.columns;
        if cols.amount.is_none() && cols.debit.is_none() && cols.credit.is_none() {
            return Err(CatalogError::Invalid {
                bank: self.bank_code.clone(),
                reason: "needs an amount column or a debit/credit column".to_string(),
            });
        }
        Ok(())
    }

    /// Configured header names in column order. Literal indices are omitted.
    pub fn header_names(&self) -> Vec<String> {
        self.columns
            .fields()
            .into_iter()
            .filter_map(|(_, col)| match col {
                ColumnRef::Header(name) => Some(name.clone()),
                ColumnRef::Index(_) => None,
            })
            .collect()
    }
}

/// Header predicate evaluated against the lower-cased, space-joined header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// Every keyword must appear.
    All(Vec<String>),
    /// At least one keyword must appear.
    Any(Vec<String>),
}

impl Detection {
    pub fn matches(&self, joined_header: &str) -> bool {
        match self {
            Detection::All(keywords) => keywords
                .iter()
                .all(|k| joined_header.contains(&k.to_lowercase())),
            Detection::Any(keywords) => keywords
                .iter()
                .any(|k| joined_header.contains(&k.to_lowercase())),
        }
    }

    fn keywords(&self) -> &[String] {
        match self {
            Detection::All(k) | Detection::Any(k) => k,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub detect: Detection,
    pub spec: BankFormatSpec,
}

impl CatalogEntry {
    /// A header row this entry's predicate accepts: the format's header names,
    /// plus whichever detection keywords they do not already carry (some
    /// banks are only recognizable by their name appearing in the header).
    pub fn canonical_header_row(&self) -> Vec<String> {
        let mut row = self.spec.header_names();
        let joined = row.join(" ").to_lowercase();
        match &self.detect {
            Detection::All(keywords) => {
                row.extend(keywords.iter().filter(|k| !joined.contains(k.as_str())).cloned());
            }
            Detection::Any(keywords) => {
                if !keywords.iter().any(|k| joined.contains(k.as_str())) {
                    row.extend(keywords.first().cloned());
                }
            }
        }
        row
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid format for {bank}: {reason}")]
    Invalid { bank: String, reason: String },
}

/// Ordered registry of bank formats. Entry order is the detection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct CatalogFile {
    banks: Vec<CatalogEntry>,
}

impl FormatCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        for entry in &entries {
            entry.spec.validate()?;
            if entry.detect.keywords().is_empty() {
                return Err(CatalogError::Invalid {
                    bank: entry.spec.bank_code.clone(),
                    reason: "detection predicate has no keywords".to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(toml_content)?;
        Self::new(file.banks)
    }

    /// The built-in profiles for Indian retail banks, in detection order.
    pub fn indian_banks() -> Self {
        Self {
            entries: INDIAN_BANKS.iter().map(BankRow::to_entry).collect(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn specs(&self) -> impl Iterator<Item = &BankFormatSpec> {
        self.entries.iter().map(|e| &e.spec)
    }

    pub fn by_code(&self, code: &str) -> Option<&BankFormatSpec> {
        self.specs().find(|s| s.bank_code.eq_ignore_ascii_case(code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::indian_banks()
    }
}

// ── Built-in table ────────────────────────────────────────────────────────────

enum Predicate {
    All(&'static [&'static str]),
    Any(&'static [&'static str]),
}

struct BankRow {
    code: &'static str,
    name: &'static str,
    /// date, description, debit, credit, balance, reference
    columns: [&'static str; 6],
    date_format: &'static str,
    sheet_name: Option<&'static str>,
    detect: Predicate,
}

impl BankRow {
    fn to_entry(&self) -> CatalogEntry {
        let [date, description, debit, credit, balance, reference] = self.columns;
        let owned = |ks: &[&str]| -> Vec<String> { ks.iter().map(|k| k.to_string()).collect() };
        CatalogEntry {
            detect: match self.detect {
                Predicate::All(ks) => Detection::All(owned(ks)),
                Predicate::Any(ks) => Detection::Any(owned(ks)),
            },
            spec: BankFormatSpec {
                bank_name: self.name.to_string(),
                bank_code: self.code.to_string(),
                columns: ColumnMap {
                    date: ColumnRef::header(date),
                    description: ColumnRef::header(description),
                    debit: Some(ColumnRef::header(debit)),
                    credit: Some(ColumnRef::header(credit)),
                    amount: None,
                    balance: Some(ColumnRef::header(balance)),
                    reference: Some(ColumnRef::header(reference)),
                },
                date_format: self.date_format.to_string(),
                skip_rows: 1,
                sheet_name: self.sheet_name.map(str::to_string),
            },
        }
    }
}

const INDIAN_BANKS: &[BankRow] = &[
    BankRow {
        code: "SBI",
        name: "State Bank of India",
        columns: ["Txn Date", "Description", "Debit", "Credit", "Balance", "Ref No./Cheque No."],
        date_format: "DD MMM YYYY",
        sheet_name: Some("Sheet1"),
        detect: Predicate::All(&["txn date", "ref no./cheque no."]),
    },
    BankRow {
        code: "HDFC",
        name: "HDFC Bank",
        columns: ["Date", "Narration", "Debit Amount", "Credit Amount", "Balance", "Chq/Ref Number"],
        date_format: "DD/MM/YY",
        sheet_name: None,
        detect: Predicate::All(&["narration", "chq/ref number"]),
    },
    BankRow {
        code: "ICICI",
        name: "ICICI Bank",
        columns: [
            "Transaction Date",
            "Transaction Remarks",
            "Withdrawal Amount (INR )",
            "Deposit Amount (INR )",
            "Balance (INR )",
            "Reference Number",
        ],
        date_format: "DD-MM-YYYY",
        sheet_name: None,
        detect: Predicate::All(&["transaction remarks", "withdrawal amount"]),
    },
    BankRow {
        code: "AXIS",
        name: "Axis Bank",
        columns: ["Transaction Date", "Description", "Debit", "Credit", "Balance", "Reference Number"],
        date_format: "DD-MM-YYYY",
        sheet_name: None,
        detect: Predicate::All(&["transaction date", "axis"]),
    },
    BankRow {
        code: "KOTAK",
        name: "Kotak Mahindra Bank",
        columns: ["Date", "Description", "Debit Amount", "Credit Amount", "Balance", "Instrument Number"],
        date_format: "DD/MM/YYYY",
        sheet_name: None,
        detect: Predicate::All(&["instrument number", "kotak"]),
    },
    BankRow {
        code: "PNB",
        name: "Punjab National Bank",
        columns: ["Date", "Description", "Debit", "Credit", "Balance", "Cheque Number"],
        date_format: "DD-MM-YYYY",
        sheet_name: None,
        detect: Predicate::All(&["cheque number", "punjab"]),
    },
    BankRow {
        code: "BOI",
        name: "Bank of India",
        columns: [
            "Transaction Date",
            "Transaction Particulars",
            "Debit Amount",
            "Credit Amount",
            "Available Balance",
            "Reference Number",
        ],
        date_format: "DD/MM/YYYY",
        sheet_name: None,
        detect: Predicate::All(&["transaction particulars", "available balance"]),
    },
    BankRow {
        code: "CANARA",
        name: "Canara Bank",
        columns: ["Date", "Particulars", "Debit", "Credit", "Balance", "Ref Number"],
        date_format: "DD/MM/YYYY",
        sheet_name: None,
        detect: Predicate::All(&["particulars", "canara"]),
    },
    BankRow {
        code: "UNION",
        name: "Union Bank of India",
        columns: [
            "Date",
            "Transaction Details",
            "Debit Amount",
            "Credit Amount",
            "Balance Amount",
            "Reference No",
        ],
        date_format: "DD-MM-YYYY",
        sheet_name: None,
        detect: Predicate::All(&["transaction details", "union"]),
    },
    BankRow {
        code: "IDBI",
        name: "IDBI Bank",
        columns: ["Transaction Date", "Description", "Debit Amount", "Credit Amount", "Balance", "Reference Number"],
        date_format: "DD/MM/YYYY",
        sheet_name: None,
        detect: Predicate::Any(&["idbi", "industrial development bank"]),
    },
];
