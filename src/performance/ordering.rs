use crate::model::Transaction;

/// Sort transactions ascending by date, then by kind priority.
///
/// The sort is stable, so transactions of the same date and kind keep the
/// order in which they were added.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.kind.sort_priority().cmp(&b.kind.sort_priority()))
    });
}
