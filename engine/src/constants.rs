//! Wire-level constants.
//!
//! Names shared with the audit bus and the invoice history table.

/// Audit event source identifiers.
pub mod sources {
    /// Events originating from the invoice application.
    pub const INVOICE: &str = "app.invoice";
}

/// Audit event categories.
pub mod categories {
    /// Invoice lifecycle events.
    pub const INVOICE: &str = "invoice";
}

/// `errorDetail` values carried in audit events.
pub mod error_details {
    /// The uploaded document's invoice number failed validation.
    pub const FAIL_NO_INVOICE_NUMBER: &str = "FAIL_NO_INVOICE_NUMBER";

    /// A transaction expired while still waiting for its upload.
    pub const TIMEOUT: &str = "TIMEOUT";
}

/// Invoice history entry types.
pub mod event_types {
    /// A new invoice record landed in the table.
    pub const INVOICE_CREATED: &str = "INVOICE_CREATED";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(sources::INVOICE, "app.invoice");
        assert_eq!(error_details::FAIL_NO_INVOICE_NUMBER, "FAIL_NO_INVOICE_NUMBER");
        assert_eq!(error_details::TIMEOUT, "TIMEOUT");
        assert_eq!(event_types::INVOICE_CREATED, "INVOICE_CREATED");
    }
}
