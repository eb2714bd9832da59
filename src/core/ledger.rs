//! Ledger projections and the dashboard digest.
//!
//! Everything here is recomputed from the current collections on every call;
//! nothing is stored.

use crate::models::{
    AttendanceTally, EntryKind, FinancialRecord, Meeting, Member, Notice, RosterData,
};

/// Number of notices shown on the dashboard.
pub const DASHBOARD_NOTICES: usize = 2;
/// Number of members shown on the dashboard.
pub const DASHBOARD_MEMBERS: usize = 5;

/// Income minus expenses over all records.
#[must_use]
pub fn total_balance(records: &[FinancialRecord]) -> i64 {
    records
        .iter()
        .map(FinancialRecord::signed_amount)
        .fold(0, i64::saturating_add)
}

/// Sum of the amounts of one kind.
#[must_use]
pub fn total_of(records: &[FinancialRecord], kind: EntryKind) -> u64 {
    records
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.amount)
        .fold(0, u64::saturating_add)
}

/// Totals over the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSummary {
    /// Sum of income entries
    pub income: u64,
    /// Sum of expense entries
    pub expense: u64,
    /// Income minus expenses
    pub balance: i64,
    /// Number of entries
    pub entries: usize,
}

/// Summarizes the ledger.
#[must_use]
pub fn summarize(records: &[FinancialRecord]) -> LedgerSummary {
    LedgerSummary {
        income: total_of(records, EntryKind::Income),
        expense: total_of(records, EntryKind::Expense),
        balance: total_balance(records),
        entries: records.len(),
    }
}

/// What the club's front page shows.
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    /// Registered members
    pub member_count: usize,
    /// First meeting in the list, with its attendance counts
    pub next_meeting: Option<(&'a Meeting, AttendanceTally)>,
    /// Newest notices
    pub recent_notices: &'a [Notice],
    /// First few members in registration order
    pub featured_members: &'a [Member],
    /// Ledger totals
    pub ledger: LedgerSummary,
}

/// Builds the dashboard digest for a roster.
#[must_use]
pub fn dashboard(data: &RosterData) -> Dashboard<'_> {
    Dashboard {
        member_count: data.members.len(),
        next_meeting: data
            .meetings
            .first()
            .map(|meeting| (meeting, meeting.tally(&data.members))),
        recent_notices: &data.notices[..data.notices.len().min(DASHBOARD_NOTICES)],
        featured_members: &data.members[..data.members.len().min(DASHBOARD_MEMBERS)],
        ledger: summarize(&data.finances),
    }
}

/// Formats an amount with thousands separators, e.g. `-1,250,000`.
#[must_use]
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
