//! Basic types shared by the form and the views

use serde::{Deserialize, Serialize};

/// Transaction type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money into a target account
    Deposit,
    /// Money out of a source account
    Withdraw,
    /// Money between two accounts of the same client
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Deposit,
        TransactionType::Withdraw,
        TransactionType::Transfer,
    ];

    /// Wire name, as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Transfer => "TRANSFER",
        }
    }

    /// Whether the amount is bounded by the source account balance
    pub fn debits_source(&self) -> bool {
        matches!(self, TransactionType::Withdraw | TransactionType::Transfer)
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAW" => Ok(TransactionType::Withdraw),
            "TRANSFER" => Ok(TransactionType::Transfer),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of the transaction form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    TransactionType,
    SourceBankAccountId,
    TargetBankAccountId,
    Amount,
    #[serde(rename = "withdrawFullValue")]
    WithdrawFullValue,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::TransactionType,
        FormField::SourceBankAccountId,
        FormField::TargetBankAccountId,
        FormField::Amount,
        FormField::WithdrawFullValue,
        FormField::Description,
    ];

    /// HTML/JSON name of the field
    pub fn name(&self) -> &'static str {
        match self {
            FormField::TransactionType => "transaction_type",
            FormField::SourceBankAccountId => "source_bank_account_id",
            FormField::TargetBankAccountId => "target_bank_account_id",
            FormField::Amount => "amount",
            FormField::WithdrawFullValue => "withdrawFullValue",
            FormField::Description => "description",
        }
    }
}

impl std::str::FromStr for FormField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transaction_type" => Ok(FormField::TransactionType),
            "source_bank_account_id" => Ok(FormField::SourceBankAccountId),
            "target_bank_account_id" => Ok(FormField::TargetBankAccountId),
            "amount" => Ok(FormField::Amount),
            "withdrawFullValue" => Ok(FormField::WithdrawFullValue),
            "description" => Ok(FormField::Description),
            _ => Err(format!("Unknown form field: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("DEPOSIT".parse::<TransactionType>(), Ok(TransactionType::Deposit));
        assert_eq!("withdraw".parse::<TransactionType>(), Ok(TransactionType::Withdraw));
        assert!("REFUND".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_wire_name() {
        let json = serde_json::to_string(&TransactionType::Transfer).unwrap();
        assert_eq!(json, "\"TRANSFER\"");
        assert_eq!(TransactionType::Deposit.to_string(), "DEPOSIT");
    }

    #[test]
    fn test_form_field_names_round_trip() {
        for field in FormField::ALL {
            assert_eq!(field.name().parse::<FormField>(), Ok(field));
        }
    }
}
