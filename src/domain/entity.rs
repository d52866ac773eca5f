/// Describes one kind of tracked record. Payments and transfers share the
/// record shape and lifecycle; only naming and storage location differ.
pub trait Entity: Clone + Copy + Default + Send + Sync + 'static {
    /// Singular name used in routes and client-facing messages.
    const NAME: &'static str;
    /// Backing table in the relational store.
    const TABLE: &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Payment;

impl Entity for Payment {
    const NAME: &'static str = "payment";
    const TABLE: &'static str = "payments";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transfer;

impl Entity for Transfer {
    const NAME: &'static str = "transfer";
    const TABLE: &'static str = "transfers";
}
