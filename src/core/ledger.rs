//! Ledger/balance calculator
//!
//! Pure derivations over a slice of payments. Nothing here holds state or
//! touches storage; callers pass in the payments that belong to the account,
//! bill or order being summarized.

use crate::types::{
    EntityBalance, LedgerLine, LedgerSummary, Payment, PaymentDirection, PaymentStatus,
};
use rust_decimal::Decimal;

/// Sum incoming and outgoing amounts in one pass
///
/// `balance` is always exactly `total_incoming - total_outgoing`. An empty
/// slice yields the all-zero summary.
pub fn compute_summary(payments: &[Payment]) -> LedgerSummary {
    let (total_incoming, total_outgoing) = payments.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(incoming, outgoing), payment| match payment.direction {
            PaymentDirection::Incoming => (incoming + payment.amount, outgoing),
            PaymentDirection::Outgoing => (incoming, outgoing + payment.amount),
        },
    );

    LedgerSummary {
        total_incoming,
        total_outgoing,
        balance: total_incoming - total_outgoing,
    }
}

/// Amount still owed on an entity
///
/// `remaining = entity_total - net_paid - discount`, where `net_paid` nets the
/// incoming payments against the outgoing ones (refunds). `payments` must
/// already be restricted to the entity.
pub fn compute_entity_balance(
    entity_total: Decimal,
    discount: Decimal,
    payments: &[Payment],
) -> Decimal {
    let net_paid = compute_summary(payments).balance;
    entity_total - net_paid - discount
}

/// Map a remaining balance to a status
///
/// - `remaining <= 0` is paid
/// - `0 < remaining < entity_total` is partial
/// - `remaining >= entity_total` is unpaid
pub fn derive_status(entity_total: Decimal, remaining: Decimal) -> PaymentStatus {
    if remaining <= Decimal::ZERO {
        PaymentStatus::Paid
    } else if remaining < entity_total {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}

/// Remaining balance and status bundled together
pub fn entity_balance(
    entity_total: Decimal,
    discount: Decimal,
    payments: &[Payment],
) -> EntityBalance {
    let net_paid = compute_summary(payments).balance;
    let remaining = entity_total - net_paid - discount;
    EntityBalance {
        total: entity_total,
        discount,
        net_paid,
        remaining,
        status: derive_status(entity_total, remaining),
    }
}

/// Chronological view of an account with a running balance
///
/// Rows are ordered by payment date, oldest first. Payments sharing a date
/// keep the order in which they were recorded. Since stores hold payments
/// most-recent-first, the input is walked in reverse before the stable sort.
pub fn statement(payments: &[Payment]) -> Vec<LedgerLine> {
    let mut ordered: Vec<&Payment> = payments.iter().rev().collect();
    ordered.sort_by_key(|payment| payment.date);

    let mut running = Decimal::ZERO;
    ordered
        .into_iter()
        .map(|payment| {
            match payment.direction {
                PaymentDirection::Incoming => running += payment.amount,
                PaymentDirection::Outgoing => running -= payment.amount,
            }
            LedgerLine {
                payment_id: payment.id.clone(),
                date: payment.date,
                direction: payment.direction,
                amount: payment.amount,
                running_balance: running,
                reference: payment.reference.clone(),
            }
        })
        .collect()
}
