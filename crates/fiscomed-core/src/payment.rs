//! SAT payment-method catalog and the cash-deductibility rule
//!
//! The SAT (Mexican tax authority) publishes a fixed catalog of payment-method
//! codes for CFDI invoices. Inputs are accepted either as a raw code ("01")
//! or as the composite dropdown label ("01 - Efectivo").
//!
//! Cash payments above [`CASH_DEDUCTIBLE_LIMIT`] are never deductible,
//! regardless of classification; the policy reports this with a
//! human-readable warning rather than a silent rejection.

/// A SAT payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatPaymentMethod {
    pub code: &'static str,
    pub description: &'static str,
    pub is_cash: bool,
}

/// Fixed SAT catalog of payment-method codes for CFDI
pub const SAT_PAYMENT_METHODS: &[SatPaymentMethod] = &[
    SatPaymentMethod {
        code: "01",
        description: "Efectivo",
        is_cash: true,
    },
    SatPaymentMethod {
        code: "02",
        description: "Cheque nominativo",
        is_cash: false,
    },
    SatPaymentMethod {
        code: "03",
        description: "Transferencia electrónica",
        is_cash: false,
    },
    SatPaymentMethod {
        code: "04",
        description: "Tarjeta de crédito",
        is_cash: false,
    },
    SatPaymentMethod {
        code: "28",
        description: "Tarjeta de débito",
        is_cash: false,
    },
    SatPaymentMethod {
        code: "99",
        description: "Por definir",
        is_cash: false,
    },
];

/// Cash expenses strictly above this amount are never deductible
pub const CASH_DEDUCTIBLE_LIMIT: f64 = 2000.0;

/// Composite "CODE - Description" labels for dropdowns
pub fn payment_methods() -> Vec<String> {
    SAT_PAYMENT_METHODS
        .iter()
        .map(|method| format!("{} - {}", method.code, method.description))
        .collect()
}

/// Extract the code prefix from a raw code or "CODE - Description" label
pub fn extract_code(code_or_label: &str) -> &str {
    code_or_label
        .split(" - ")
        .next()
        .unwrap_or("")
        .trim()
}

fn find(code_or_label: &str) -> Option<&'static SatPaymentMethod> {
    let code = extract_code(code_or_label);
    SAT_PAYMENT_METHODS.iter().find(|method| method.code == code)
}

/// Whether a payment-method code or label is in the SAT catalog
pub fn is_valid_code(code_or_label: &str) -> bool {
    find(code_or_label).is_some()
}

/// Whether a payment-method code or label denotes cash
pub fn is_cash(code_or_label: &str) -> bool {
    find(code_or_label).map(|method| method.is_cash).unwrap_or(false)
}

/// Outcome of the cash-deductibility evaluation
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CashDeductibility {
    pub is_deductible: bool,
    /// Human-readable warning; None when the payment is eligible
    pub message: Option<String>,
    pub warning: bool,
}

/// Apply the cash-payment deductibility rule
///
/// Non-cash payments are always eligible. Cash payments strictly above
/// $2,000 are never deductible; the threshold itself remains eligible.
/// This rule overrides any classification-derived percentage.
pub fn evaluate_cash_deductibility(amount: f64, code_or_label: &str) -> CashDeductibility {
    if !is_cash(code_or_label) {
        return CashDeductibility {
            is_deductible: true,
            message: None,
            warning: false,
        };
    }

    if amount > CASH_DEDUCTIBLE_LIMIT {
        return CashDeductibility {
            is_deductible: false,
            message: Some(
                "Gastos en efectivo mayores a $2,000 no son deducibles según la \
                 legislación fiscal mexicana."
                    .to_string(),
            ),
            warning: true,
        };
    }

    CashDeductibility {
        is_deductible: true,
        message: None,
        warning: false,
    }
}
