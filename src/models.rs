//! Domain model - the four record kinds held by a club roster.
//!
//! Field names on the wire follow the documents written by the club's web app
//! (`phoneNumber`, `content`, `isImportant`, `type`), and the localized enum labels it
//! used are accepted when reading, so older share links and stored data still load.

use crate::errors::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Allocates a fresh opaque record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Position a member holds in the club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    /// Club chair
    #[serde(alias = "회장")]
    Chair,
    /// Club secretary, usually the treasurer as well
    #[serde(alias = "총무")]
    Secretary,
    /// Regular member
    #[serde(alias = "회원")]
    Member,
}

impl MemberRole {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chair => "Chair",
            Self::Secretary => "Secretary",
            Self::Member => "Member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MemberRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chair" | "회장" => Ok(Self::Chair),
            "secretary" | "총무" => Ok(Self::Secretary),
            "member" | "회원" => Ok(Self::Member),
            _ => Err(ValidationError::InvalidValue {
                field: "role",
                value: s.to_string(),
            }),
        }
    }
}

/// A member's answer for one meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Will attend
    #[serde(alias = "참석")]
    Attending,
    /// Will not attend
    #[serde(alias = "불참")]
    Absent,
    /// Has not answered yet
    #[default]
    #[serde(alias = "미정")]
    Pending,
}

impl AttendanceStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attending => "attending",
            Self::Absent => "absent",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attending" | "참석" => Ok(Self::Attending),
            "absent" | "불참" => Ok(Self::Absent),
            "pending" | "미정" => Ok(Self::Pending),
            _ => Err(ValidationError::InvalidValue {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Dues or other money coming in
    Income,
    /// Money spent by the club
    Expense,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Income => "income",
            Self::Expense => "expense",
        })
    }
}

impl FromStr for EntryKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(ValidationError::InvalidValue {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// A registered club member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Position in the club
    pub role: MemberRole,
    /// Contact number, free text
    pub phone_number: String,
}

/// A scheduled club meeting, usually a round of golf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Opaque unique id
    pub id: String,
    /// Calendar date of the meeting
    pub date: NaiveDate,
    /// Venue, free text
    pub location: String,
    /// Member id to answer. Ids of deleted members are kept.
    #[serde(default)]
    pub attendance: BTreeMap<String, AttendanceStatus>,
}

impl Meeting {
    /// Status for a member; members without an entry are pending.
    #[must_use]
    pub fn status_of(&self, member_id: &str) -> AttendanceStatus {
        self.attendance
            .get(member_id)
            .copied()
            .unwrap_or_default()
    }

    /// Counts answers across the given roster.
    ///
    /// Only current members are counted, so entries left behind by deleted members
    /// are ignored and members who never answered count as pending.
    #[must_use]
    pub fn tally(&self, members: &[Member]) -> AttendanceTally {
        members
            .iter()
            .fold(AttendanceTally::default(), |mut tally, member| {
                match self.status_of(&member.id) {
                    AttendanceStatus::Attending => tally.attending += 1,
                    AttendanceStatus::Absent => tally.absent += 1,
                    AttendanceStatus::Pending => tally.pending += 1,
                }
                tally
            })
    }
}

/// Attendance counts for one meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTally {
    /// Members attending
    pub attending: usize,
    /// Members not attending
    pub absent: usize,
    /// Members who have not answered
    pub pending: usize,
}

/// A posted notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Opaque unique id
    pub id: String,
    /// Headline
    pub title: String,
    /// Body text
    #[serde(rename = "content")]
    pub body: String,
    /// Date the notice was posted
    pub date: NaiveDate,
    /// Pinned as important
    #[serde(rename = "isImportant")]
    pub important: bool,
}

/// One line in the dues ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Opaque unique id
    pub id: String,
    /// Date of the entry
    pub date: NaiveDate,
    /// What the money was for
    pub description: String,
    /// Amount in whole currency units
    pub amount: u64,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FinancialRecord {
    /// The amount's effect on the balance: positive for income, negative for expenses.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        let amount = i64::try_from(self.amount).unwrap_or(i64::MAX);
        match self.kind {
            EntryKind::Income => amount,
            EntryKind::Expense => -amount,
        }
    }
}

/// Names one of the four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// [`Member`] records
    Members,
    /// [`Notice`] records
    Notices,
    /// [`FinancialRecord`] records
    Finances,
    /// [`Meeting`] records
    Meetings,
}

impl CollectionKind {
    /// Every collection, in load order.
    pub const ALL: [Self; 4] = [Self::Members, Self::Notices, Self::Finances, Self::Meetings];

    /// The durable key this collection is stored under.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Members => "club_members",
            Self::Notices => "club_notices",
            Self::Finances => "club_finances",
            Self::Meetings => "club_meetings",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Members => "members",
            Self::Notices => "notices",
            Self::Finances => "finances",
            Self::Meetings => "meetings",
        })
    }
}

impl FromStr for CollectionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" | "members" => Ok(Self::Members),
            "notice" | "notices" => Ok(Self::Notices),
            "finance" | "finances" | "ledger" | "record" | "records" => Ok(Self::Finances),
            "meeting" | "meetings" => Ok(Self::Meetings),
            _ => Err(ValidationError::InvalidValue {
                field: "collection",
                value: s.to_string(),
            }),
        }
    }
}

/// The complete durable state: all four collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterData {
    /// Registered members, in registration order
    pub members: Vec<Member>,
    /// Notices, newest first
    pub notices: Vec<Notice>,
    /// Ledger entries, newest first
    pub finances: Vec<FinancialRecord>,
    /// Meetings, in creation order
    pub meetings: Vec<Meeting>,
}

impl RosterData {
    /// Whether all four collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
            && self.notices.is_empty()
            && self.finances.is_empty()
            && self.meetings.is_empty()
    }

    /// Income minus expenses over the ledger, recomputed on every call.
    #[must_use]
    pub fn total_balance(&self) -> i64 {
        crate::core::ledger::total_balance(&self.finances)
    }

    /// Number of records held in the given collection.
    #[must_use]
    pub fn len_of(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Members => self.members.len(),
            CollectionKind::Notices => self.notices.len(),
            CollectionKind::Finances => self.finances.len(),
            CollectionKind::Meetings => self.meetings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn member(id: &str) -> Member {
        Member {
            id: id.to_string(),
            name: format!("Member {id}"),
            role: MemberRole::Member,
            phone_number: "010-0000-0000".to_string(),
        }
    }

    fn meeting() -> Meeting {
        Meeting {
            id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            location: "Happy Golf CC".to_string(),
            attendance: BTreeMap::new(),
        }
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let meeting = meeting();
        assert_eq!(meeting.status_of("anyone"), AttendanceStatus::Pending);
    }

    #[test]
    fn test_tally_ignores_stale_ids_and_counts_unanswered_as_pending() {
        let mut meeting = meeting();
        meeting
            .attendance
            .insert("1".to_string(), AttendanceStatus::Attending);
        meeting
            .attendance
            .insert("2".to_string(), AttendanceStatus::Absent);
        meeting
            .attendance
            .insert("deleted".to_string(), AttendanceStatus::Attending);

        let tally = meeting.tally(&[member("1"), member("2"), member("3")]);
        assert_eq!(
            tally,
            AttendanceTally {
                attending: 1,
                absent: 1,
                pending: 1,
            }
        );
    }

    #[test]
    fn test_reads_documents_written_by_web_client() {
        let json = r#"{
            "members": [{"id":"1","name":"Kim","role":"회장","phoneNumber":"010-1234-5678"}],
            "notices": [{"id":"1","title":"March round","content":"See you","date":"2024-03-01","isImportant":true}],
            "finances": [{"id":"1","date":"2024-03-01","description":"Dues","amount":400000,"type":"INCOME"}],
            "meetings": [{"id":"m1","date":"2024-03-15","location":"CC","attendance":{"1":"참석","2":"미정"}}]
        }"#;

        let data: RosterData = serde_json::from_str(json).unwrap();
        assert_eq!(data.members[0].role, MemberRole::Chair);
        assert_eq!(data.members[0].phone_number, "010-1234-5678");
        assert_eq!(data.notices[0].body, "See you");
        assert!(data.notices[0].important);
        assert_eq!(data.finances[0].kind, EntryKind::Income);
        assert_eq!(
            data.meetings[0].status_of("1"),
            AttendanceStatus::Attending
        );
    }

    #[test]
    fn test_writes_web_client_field_names() {
        let record = FinancialRecord {
            id: "f1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            description: "Snacks".to_string(),
            amount: 150_000,
            kind: EntryKind::Expense,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["date"], "2024-03-02");

        let json = serde_json::to_value(member("1")).unwrap();
        assert_eq!(json["phoneNumber"], "010-0000-0000");
        assert_eq!(json["role"], "Member");
    }

    #[test]
    fn test_signed_amount() {
        let mut record = FinancialRecord {
            id: "f1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            description: "Dues".to_string(),
            amount: 400_000,
            kind: EntryKind::Income,
        };
        assert_eq!(record.signed_amount(), 400_000);
        record.kind = EntryKind::Expense;
        assert_eq!(record.signed_amount(), -400_000);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Chair".parse::<MemberRole>().unwrap(), MemberRole::Chair);
        assert_eq!(
            " absent ".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Absent
        );
        assert_eq!("EXPENSE".parse::<EntryKind>().unwrap(), EntryKind::Expense);
        assert_eq!(
            "records".parse::<CollectionKind>().unwrap(),
            CollectionKind::Finances
        );
        assert!("treasurer".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
