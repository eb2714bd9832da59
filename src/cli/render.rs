//! Plain-text rendering of roster views for the terminal.

use crate::{
    core::ledger::{Dashboard, LedgerSummary, format_amount, summarize},
    models::{AttendanceStatus, FinancialRecord, Meeting, Member, Notice},
};
use std::fmt::Write;

const CURRENCY: &str = "won";

fn money(amount: i64) -> String {
    format!("{} {CURRENCY}", format_amount(amount))
}

fn money_unsigned(amount: u64) -> String {
    money(i64::try_from(amount).unwrap_or(i64::MAX))
}

fn ledger_totals(out: &mut String, summary: &LedgerSummary) {
    let _ = writeln!(out, "Income:  {}", money_unsigned(summary.income));
    let _ = writeln!(out, "Expense: {}", money_unsigned(summary.expense));
    let _ = writeln!(out, "Balance: {}", money(summary.balance));
}

/// The dashboard digest.
#[must_use]
pub fn dashboard(board: &Dashboard<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📋 Club dashboard ({} members)", board.member_count);
    out.push('\n');

    match board.next_meeting {
        Some((meeting, tally)) => {
            let _ = writeln!(out, "Next meeting: {} at {}", meeting.date, meeting.location);
            let _ = writeln!(
                out,
                "  ✅ {} attending  ❌ {} absent  ⏳ {} pending",
                tally.attending, tally.absent, tally.pending
            );
        }
        None => out.push_str("No meetings scheduled.\n"),
    }
    out.push('\n');

    if board.recent_notices.is_empty() {
        out.push_str("No notices.\n");
    } else {
        out.push_str("Latest notices:\n");
        for notice in board.recent_notices {
            let _ = writeln!(out, "  • {}", notice_headline(notice));
        }
    }
    out.push('\n');

    if !board.featured_members.is_empty() {
        out.push_str("Members:\n");
        for member in board.featured_members {
            let _ = writeln!(out, "  • {} ({})", member.name, member.role);
        }
        out.push('\n');
    }

    ledger_totals(&mut out, &board.ledger);
    out
}

fn notice_headline(notice: &Notice) -> String {
    let pin = if notice.important { "📌 " } else { "" };
    format!("{pin}{} [{}]", notice.title, notice.date)
}

/// Member list with ids.
#[must_use]
pub fn members(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members registered.\n".to_string();
    }
    let mut out = format!("{} members:\n", members.len());
    for member in members {
        let _ = writeln!(
            out,
            "  • {} ({}) {}  [id: {}]",
            member.name, member.role, member.phone_number, member.id
        );
    }
    out
}

/// Meetings with each current member's answer.
#[must_use]
pub fn meetings(meetings: &[Meeting], members: &[Member]) -> String {
    if meetings.is_empty() {
        return "No meetings scheduled.\n".to_string();
    }
    let mut out = String::new();
    for meeting in meetings {
        let tally = meeting.tally(members);
        let _ = writeln!(
            out,
            "{} at {}  [id: {}]  ✅ {} ❌ {} ⏳ {}",
            meeting.date,
            meeting.location,
            meeting.id,
            tally.attending,
            tally.absent,
            tally.pending
        );
        for member in members {
            let icon = match meeting.status_of(&member.id) {
                AttendanceStatus::Attending => "✅",
                AttendanceStatus::Absent => "❌",
                AttendanceStatus::Pending => "⏳",
            };
            let _ = writeln!(out, "  {icon} {}", member.name);
        }
    }
    out
}

/// Notices with their bodies.
#[must_use]
pub fn notices(notices: &[Notice]) -> String {
    if notices.is_empty() {
        return "No notices.\n".to_string();
    }
    let mut out = String::new();
    for notice in notices {
        let _ = writeln!(out, "{}  [id: {}]", notice_headline(notice), notice.id);
        for line in notice.body.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}

/// Ledger entries followed by totals.
#[must_use]
pub fn ledger(records: &[FinancialRecord]) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No ledger entries.\n");
    }
    for record in records {
        let _ = writeln!(
            out,
            "{}  {:<30} {:>16}  [id: {}]",
            record.date,
            record.description,
            money(record.signed_amount()),
            record.id
        );
    }
    out.push('\n');
    ledger_totals(&mut out, &summarize(records));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger;
    use crate::models::RosterData;
    use crate::test_utils::sample_roster;

    #[test]
    fn test_dashboard_mentions_meeting_notices_and_balance() {
        let data = sample_roster();
        let text = dashboard(&ledger::dashboard(&data));

        assert!(text.contains("Next meeting: 2024-03-15 at Happy Golf CC"));
        assert!(text.contains("✅ 2 attending  ❌ 1 absent  ⏳ 1 pending"));
        assert!(text.contains("📌 March round"));
        assert!(text.contains("Balance: 250,000 won"));
    }

    #[test]
    fn test_dashboard_of_empty_roster() {
        let data = RosterData::default();
        let text = dashboard(&ledger::dashboard(&data));
        assert!(text.contains("No meetings scheduled."));
        assert!(text.contains("Balance: 0 won"));
    }

    #[test]
    fn test_ledger_shows_signed_amounts() {
        let text = ledger(&sample_roster().finances);
        assert!(text.contains("400,000 won"));
        assert!(text.contains("-150,000 won"));
        assert!(text.contains("Expense: 150,000 won"));
    }

    #[test]
    fn test_meetings_list_every_member() {
        let data = sample_roster();
        let text = meetings(&data.meetings, &data.members);
        assert!(text.contains("❌ Choi"));
        assert!(text.contains("⏳ Park"));
    }
}
