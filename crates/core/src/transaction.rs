use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::money::Money;

/// Direction of a transaction. Amounts are always stored as magnitudes and
/// this tag carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::Credit => write!(f, "credit"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(TransactionType::Debit),
            "credit" => Ok(TransactionType::Credit),
            other => Err(format!("Unknown transaction type: '{other}'")),
        }
    }
}

/// One statement row after column resolution and normalization, before
/// categorization. Lives only for the duration of a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    /// Non-negative magnitude.
    pub amount: Money,
    pub balance: Option<Money>,
    pub reference: Option<String>,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorization {
    pub category: String,
    pub subcategory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankInfo {
    pub bank_name: String,
    pub bank_code: String,
}

impl BankInfo {
    pub fn new(bank_name: &str, bank_code: &str) -> Self {
        BankInfo {
            bank_name: bank_name.to_string(),
            bank_code: bank_code.to_string(),
        }
    }

    /// Placeholder reported when a run fails before a format is resolved.
    pub fn unknown() -> Self {
        BankInfo::new("Unknown", "UNKNOWN")
    }
}

/// The normalized, categorized record handed to the persistence layer.
///
/// `vendor` is only ever set together with `category`, and `amount` is a
/// non-negative magnitude whose direction lives in `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub balance: Option<Money>,
    pub reference: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub vendor: Option<String>,
    pub confidence: Option<f32>,
    pub bank_name: String,
    pub bank_code: String,
    pub is_manually_reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalTransaction {
    pub fn new(
        raw: RawTransaction,
        user_id: &str,
        bank: &BankInfo,
        categorization: Option<Categorization>,
        now: DateTime<Utc>,
    ) -> Self {
        let (category, subcategory, vendor, confidence) = match categorization {
            Some(c) => (
                Some(c.category),
                Some(c.subcategory),
                c.vendor,
                Some(c.confidence.clamp(0.0, 1.0)),
            ),
            None => (None, None, None, None),
        };

        CanonicalTransaction {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            date: raw.date,
            description: raw.description,
            amount: raw.amount.abs(),
            transaction_type: raw.transaction_type,
            balance: raw.balance,
            reference: raw.reference,
            category,
            subcategory,
            vendor,
            confidence,
            bank_name: bank.bank_name.clone(),
            bank_code: bank.bank_code.clone(),
            is_manually_reviewed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount with the direction folded back into the sign (debits negative).
    pub fn signed_amount(&self) -> Money {
        match self.transaction_type {
            TransactionType::Debit => -self.amount,
            TransactionType::Credit => self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn raw(amount_paise: i64, transaction_type: TransactionType) -> RawTransaction {
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: "SWIGGY ORDER 123".to_string(),
            debit: None,
            credit: None,
            amount: Money::from_paise(amount_paise),
            balance: Some(Money::from_paise(1_000_00)),
            reference: None,
            transaction_type,
        }
    }

    #[test]
    fn transaction_type_roundtrip() {
        assert_eq!(
            TransactionType::from_str(&TransactionType::Debit.to_string()).unwrap(),
            TransactionType::Debit
        );
        assert_eq!(TransactionType::from_str("CREDIT").unwrap(), TransactionType::Credit);
        assert!(TransactionType::from_str("transfer").is_err());
    }

    #[test]
    fn new_transaction_is_unreviewed_with_matching_timestamps() {
        let now = Utc::now();
        let tx = CanonicalTransaction::new(
            raw(250_00, TransactionType::Debit),
            "user-1",
            &BankInfo::new("HDFC Bank", "HDFC"),
            None,
            now,
        );
        assert!(!tx.is_manually_reviewed);
        assert_eq!(tx.created_at, tx.updated_at);
        assert_eq!(tx.category, None);
        assert_eq!(tx.vendor, None);
        assert_eq!(tx.bank_code, "HDFC");
    }

    #[test]
    fn categorization_fields_are_copied() {
        let tx = CanonicalTransaction::new(
            raw(250_00, TransactionType::Debit),
            "user-1",
            &BankInfo::new("HDFC Bank", "HDFC"),
            Some(Categorization {
                category: "Food & Dining".to_string(),
                subcategory: "Restaurants".to_string(),
                vendor: Some("Swiggy".to_string()),
                confidence: 0.95,
            }),
            Utc::now(),
        );
        assert_eq!(tx.category.as_deref(), Some("Food & Dining"));
        assert_eq!(tx.vendor.as_deref(), Some("Swiggy"));
        assert_eq!(tx.confidence, Some(0.95));
    }

    #[test]
    fn amount_is_stored_as_magnitude() {
        let tx = CanonicalTransaction::new(
            raw(-40_00, TransactionType::Debit),
            "u",
            &BankInfo::unknown(),
            None,
            Utc::now(),
        );
        assert_eq!(tx.amount, Money::from_paise(40_00));
        assert_eq!(tx.signed_amount(), Money::from_paise(-40_00));
    }

    #[test]
    fn serializes_type_tag_lowercase() {
        let tx = CanonicalTransaction::new(
            raw(10_00, TransactionType::Credit),
            "u",
            &BankInfo::unknown(),
            None,
            Utc::now(),
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "credit");
        assert_eq!(json["isManuallyReviewed"], false);
        assert_eq!(json["date"], "2024-01-15");
    }
}
