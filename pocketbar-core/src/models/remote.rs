//! Shapes returned by the `PocketSmith` API.
//!
//! Only the fields the sensors consume are modelled. Everything else in a
//! response is dropped during decoding, which is also what keeps the raw
//! payload from ever reaching the published attributes.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Title used when the API omits one.
const UNNAMED_ACCOUNT: &str = "Unnamed Account";

/// Currency used when the API omits one.
const DEFAULT_CURRENCY: &str = "USD";

// ============================================================================
// User
// ============================================================================

/// The authenticated user, as returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: i64,
    /// Login name.
    #[serde(default)]
    pub login: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

// ============================================================================
// Account
// ============================================================================

/// A financial account, as returned by `GET /users/{id}/accounts` and
/// `GET /accounts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: i64,
    /// Account title.
    #[serde(default)]
    pub title: Option<String>,
    /// ISO currency code, any case.
    #[serde(default)]
    pub currency_code: Option<String>,
    /// Current balance in the account currency.
    #[serde(default)]
    pub current_balance: Option<Decimal>,
    /// Sub-accounts that hold the transactions.
    #[serde(default)]
    pub transaction_accounts: Option<Vec<TransactionAccount>>,
}

impl Account {
    /// Creates an account with just an ID and title.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            currency_code: None,
            current_balance: None,
            transaction_accounts: None,
        }
    }

    /// Returns the title, falling back to `"Unnamed Account"`.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNNAMED_ACCOUNT)
    }

    /// Returns the upper-cased currency code, falling back to `USD`.
    pub fn unit(&self) -> String {
        self.currency_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase()
    }

    /// Returns the current balance, zero when absent, with at least two
    /// decimal places so `152.30` is not shown as `152.3`.
    pub fn balance(&self) -> Decimal {
        let mut balance = self.current_balance.unwrap_or(Decimal::ZERO);
        if balance.scale() < 2 {
            balance.rescale(2);
        }
        balance
    }

    /// Returns the sub-accounts, empty when absent.
    pub fn transaction_accounts(&self) -> &[TransactionAccount] {
        self.transaction_accounts.as_deref().unwrap_or_default()
    }
}

/// Normalizes an account title for use in an identifier.
///
/// Lower-cases and replaces spaces with underscores. Other characters are
/// kept as-is.
pub fn normalize_title(title: &str) -> String {
    title.replace(' ', "_").to_lowercase()
}

// ============================================================================
// Transaction Account
// ============================================================================

/// A sub-account of an [`Account`].
///
/// This is the complete published shape: `id`, `account_id`, `name` and
/// `current_balance`. Any other field the API sends is discarded on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAccount {
    /// Sub-account ID.
    #[serde(default)]
    pub id: Option<i64>,
    /// Owning account ID.
    #[serde(default)]
    pub account_id: Option<i64>,
    /// Sub-account name.
    #[serde(default)]
    pub name: Option<String>,
    /// Current balance.
    #[serde(default)]
    pub current_balance: Option<Decimal>,
}

impl TransactionAccount {
    /// Converts to the JSON object published as a sensor attribute.
    ///
    /// The balance is published as a JSON number; missing fields are `null`.
    pub fn to_attribute(&self) -> Value {
        json!({
            "id": self.id,
            "account_id": self.account_id,
            "name": self.name,
            "current_balance": self.current_balance.and_then(|b| b.to_f64()),
        })
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// A transaction, as returned by `GET /users/{id}/transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    #[serde(default)]
    pub id: Option<i64>,
    /// Payee text.
    #[serde(default)]
    pub payee: Option<String>,
    /// Signed amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Category object; `None` when absent or `null`.
    #[serde(default)]
    pub category: Option<Value>,
}

impl Transaction {
    /// Returns true if this transaction has no category.
    pub fn is_uncategorised(&self) -> bool {
        matches!(self.category, None | Some(Value::Null))
    }
}

// ============================================================================
// Tests
// ============================================================================
