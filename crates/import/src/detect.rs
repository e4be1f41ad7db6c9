use crate::catalog::{BankFormatSpec, FormatCatalog};

/// Lower-cases every header cell and joins them with single spaces.
pub fn joined_header<S: AsRef<str>>(headers: &[S]) -> String {
    headers
        .iter()
        .map(|h| h.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Picks the bank format whose detection predicate accepts the header row.
///
/// Predicates are evaluated in catalog order and the first hit wins; two
/// predicates may both accept a row, in which case the earlier entry is
/// returned. There is no fallback when nothing matches.
pub fn detect_bank<'a, S: AsRef<str>>(
    catalog: &'a FormatCatalog,
    headers: &[S],
) -> Option<&'a BankFormatSpec> {
    let joined = joined_header(headers);
    catalog
        .entries()
        .iter()
        .find(|entry| entry.detect.matches(&joined))
        .map(|entry| &entry.spec)
}

impl FormatCatalog {
    pub fn detect<S: AsRef<str>>(&self, headers: &[S]) -> Option<&BankFormatSpec> {
        detect_bank(self, headers)
    }
}
