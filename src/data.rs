/// Value of the `status` column that makes a transaction eligible for an invoice.
pub const APPROVED_STATUS: &str = "Aprovado";

/// A paid transaction as read from the `transacoes` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub amount: f64,
    pub status: String,
}

impl TransactionRecord {
    /// First and last name joined by a single space, without stray whitespace.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    #[cfg(test)]
    pub(crate) fn is_approved(&self) -> bool {
        self.status == APPROVED_STATUS
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> TransactionRecord {
    TransactionRecord {
        id: 42,
        first_name: "Ana".to_string(),
        last_name: "Silva".to_string(),
        tax_id: Some("123.456.789-09".to_string()),
        email: Some("ana@example.com".to_string()),
        phone: Some("+55 11 91234-5678".to_string()),
        description: Some("Consultoria".to_string()),
        amount: 150.5,
        status: APPROVED_STATUS.to_string(),
    }
}
