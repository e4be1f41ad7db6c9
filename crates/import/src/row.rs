use khata_core::{Money, RawTransaction, TransactionType};
use thiserror::Error;

use crate::catalog::{BankFormatSpec, ColumnRef};
use crate::normalize::{normalize_amount, normalize_date, DateParseError};

#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Date(#[from] DateParseError),
}

/// Zero-based positions of each logical field in a sheet, resolved once per
/// run from the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnIndexMap {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub amount: Option<usize>,
    pub balance: Option<usize>,
    pub reference: Option<usize>,
}

impl ColumnIndexMap {
    /// Header-name references resolve to the first cell whose lower-cased
    /// text contains the lower-cased name. Literal indices are taken as-is.
    pub fn resolve<S: AsRef<str>>(header_row: &[S], spec: &BankFormatSpec) -> Self {
        let lowered: Vec<String> = header_row
            .iter()
            .map(|h| h.as_ref().to_lowercase())
            .collect();

        let mut map = ColumnIndexMap::default();
        for (field, col) in spec.columns.fields() {
            let index = match col {
                ColumnRef::Index(i) => Some(*i),
                ColumnRef::Header(name) => {
                    let needle = name.to_lowercase();
                    lowered.iter().position(|cell| cell.contains(&needle))
                }
            };
            let slot = match field {
                "date" => &mut map.date,
                "description" => &mut map.description,
                "debit" => &mut map.debit,
                "credit" => &mut map.credit,
                "amount" => &mut map.amount,
                "balance" => &mut map.balance,
                "reference" => &mut map.reference,
                _ => continue,
            };
            *slot = index;
        }
        map
    }

    /// Whether both mandatory fields found a header cell. When they did not,
    /// every row reads as blank and is skipped.
    pub fn has_required(&self) -> bool {
        self.date.is_some() && self.description.is_some()
    }
}

/// Turns one data row into a [`RawTransaction`].
///
/// `Ok(None)` means the row carries no transaction (blank or unresolved date
/// or description, or no usable amount) and should be skipped silently.
pub fn parse_row<S: AsRef<str>>(
    row: &[S],
    columns: &ColumnIndexMap,
    spec: &BankFormatSpec,
) -> Result<Option<RawTransaction>, RowError> {
    let cell = |index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .map(|c| c.as_ref().trim())
            .unwrap_or("")
    };

    let date_text = cell(columns.date);
    let description = cell(columns.description);
    if date_text.is_empty() || description.is_empty() {
        return Ok(None);
    }

    let debit = normalize_amount(cell(columns.debit)).map(Money::from_decimal);
    let credit = normalize_amount(cell(columns.credit)).map(Money::from_decimal);
    let amount = normalize_amount(cell(columns.amount)).map(Money::from_decimal);
    let balance = normalize_amount(cell(columns.balance)).map(Money::from_decimal);

    let (magnitude, transaction_type) = match (amount, debit, credit) {
        (Some(a), _, _) if a.is_negative() => (a.abs(), TransactionType::Debit),
        (Some(a), _, _) => (a, TransactionType::Credit),
        (None, Some(d), _) if d.is_positive() => (d, TransactionType::Debit),
        (None, _, Some(c)) if c.is_positive() => (c, TransactionType::Credit),
        _ => return Ok(None),
    };

    let date = normalize_date(date_text, &spec.date_format)?;
    let reference = cell(columns.reference);

    Ok(Some(RawTransaction {
        date,
        description: description.to_string(),
        debit: debit.filter(|m| !m.is_zero()),
        credit: credit.filter(|m| !m.is_zero()),
        amount: magnitude,
        balance: balance.filter(|m| !m.is_zero()),
        reference: (!reference.is_empty()).then(|| reference.to_string()),
        transaction_type,
    }))
}
