use khata_core::TransactionType::{self, Credit, Debit};

use crate::rules::{CategoryRule, VendorRule};

type CategoryRow = (&'static str, &'static str, &'static [&'static str], u32, Option<TransactionType>);

/// (category, subcategory, keywords, priority, transaction type filter)
pub const DEFAULT_CATEGORY_RULES: &[CategoryRow] = &[
    (
        "Food & Dining",
        "Restaurants",
        &["swiggy", "zomato", "uber eats", "restaurant", "hotel", "cafe", "food", "dining", "pizza", "burger", "biryani"],
        9,
        Some(Debit),
    ),
    (
        "Food & Dining",
        "Groceries",
        &["big bazaar", "dmart", "reliance fresh", "more", "grocery", "supermarket", "vegetables", "fruits", "milk"],
        9,
        Some(Debit),
    ),
    (
        "Transportation",
        "Fuel",
        &["petrol", "diesel", "fuel", "gas station", "hp", "iocl", "bpcl", "shell", "essar"],
        9,
        Some(Debit),
    ),
    (
        "Transportation",
        "Public Transport",
        &["metro", "bus", "auto", "taxi", "ola", "uber", "rapido", "train", "irctc"],
        8,
        Some(Debit),
    ),
    (
        "Shopping",
        "Online Shopping",
        &["amazon", "flipkart", "myntra", "ajio", "nykaa", "meesho", "paytm mall", "snapdeal"],
        9,
        Some(Debit),
    ),
    (
        "Shopping",
        "Clothing",
        &["clothing", "fashion", "apparel", "shirt", "dress", "shoes", "footwear", "textile"],
        7,
        Some(Debit),
    ),
    (
        "Bills & Utilities",
        "Electricity",
        &["electricity", "power", "bescom", "mseb", "kseb", "tneb", "wbsedcl", "electric bill"],
        9,
        Some(Debit),
    ),
    (
        "Bills & Utilities",
        "Mobile & Internet",
        &["airtel", "jio", "vi", "vodafone", "bsnl", "mobile", "internet", "broadband", "wifi"],
        9,
        Some(Debit),
    ),
    (
        "Bills & Utilities",
        "Water",
        &["water", "bwssb", "mcgm", "water bill", "municipal"],
        8,
        Some(Debit),
    ),
    (
        "Healthcare",
        "Medical",
        &["hospital", "clinic", "doctor", "medical", "pharmacy", "medicine", "apollo", "fortis", "max"],
        8,
        Some(Debit),
    ),
    (
        "Healthcare",
        "Insurance",
        &["insurance", "premium", "lic", "hdfc ergo", "icici lombard", "bajaj allianz", "health insurance"],
        8,
        Some(Debit),
    ),
    (
        "Entertainment",
        "Streaming",
        &["netflix", "amazon prime", "hotstar", "zee5", "sony liv", "voot", "youtube premium", "spotify"],
        8,
        Some(Debit),
    ),
    (
        "Entertainment",
        "Movies & Events",
        &["movie", "cinema", "pvr", "inox", "bookmyshow", "concert", "event", "ticket"],
        7,
        Some(Debit),
    ),
    (
        "Financial",
        "Investments",
        &["mutual fund", "sip", "zerodha", "groww", "upstox", "angel broking", "investment", "trading"],
        9,
        Some(Debit),
    ),
    (
        "Financial",
        "Loan EMI",
        &["emi", "loan", "home loan", "car loan", "personal loan", "credit card bill", "bajaj finserv"],
        9,
        Some(Debit),
    ),
    (
        "Income",
        "Salary",
        &["salary", "wages", "payroll", "income", "employer"],
        9,
        Some(Credit),
    ),
    (
        "Income",
        "Interest",
        &["interest", "fd interest", "savings interest", "dividend"],
        8,
        Some(Credit),
    ),
    (
        "Transfers",
        "UPI",
        &["upi", "paytm", "phonepe", "googlepay", "bhim", "amazon pay", "mobikwik"],
        6,
        None,
    ),
    (
        "Transfers",
        "Bank Transfer",
        &["neft", "rtgs", "imps", "transfer", "fund transfer"],
        6,
        None,
    ),
    (
        "Cash & ATM",
        "ATM Withdrawal",
        &["atm", "cash withdrawal", "withdrawal"],
        8,
        Some(Debit),
    ),
    (
        "Education",
        "Fees",
        &["school", "college", "university", "education", "fees", "tuition", "course"],
        8,
        Some(Debit),
    ),
    (
        "Government & Taxes",
        "Tax Payment",
        &["income tax", "tds", "gst", "tax", "government", "challan"],
        8,
        Some(Debit),
    ),
];

/// (vendor, category, subcategory, keywords, confidence)
pub const DEFAULT_VENDOR_RULES: &[(&str, &str, &str, &[&str], f32)] = &[
    ("Swiggy", "Food & Dining", "Restaurants", &["swiggy"], 0.95),
    ("Zomato", "Food & Dining", "Restaurants", &["zomato"], 0.95),
    ("Amazon", "Shopping", "Online Shopping", &["amazon"], 0.9),
    ("Flipkart", "Shopping", "Online Shopping", &["flipkart"], 0.9),
    ("Ola", "Transportation", "Taxi", &["ola"], 0.9),
    ("Uber", "Transportation", "Taxi", &["uber"], 0.9),
    ("Netflix", "Entertainment", "Streaming", &["netflix"], 0.95),
    ("Airtel", "Bills & Utilities", "Mobile & Internet", &["airtel"], 0.9),
    ("Jio", "Bills & Utilities", "Mobile & Internet", &["jio"], 0.9),
];

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

pub fn category_rules() -> Vec<CategoryRule> {
    DEFAULT_CATEGORY_RULES
        .iter()
        .map(|(category, subcategory, keywords, priority, transaction_type)| CategoryRule {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            keywords: owned(keywords),
            priority: *priority,
            transaction_type: *transaction_type,
            amount_range: None,
        })
        .collect()
}

pub fn vendor_rules() -> Vec<VendorRule> {
    DEFAULT_VENDOR_RULES
        .iter()
        .map(|(vendor, category, subcategory, keywords, confidence)| VendorRule {
            vendor: vendor.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            keywords: owned(keywords),
            confidence: *confidence,
        })
        .collect()
}
