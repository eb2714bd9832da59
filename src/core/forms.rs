//! Validated construction of new roster records.
//!
//! Raw input (a submitted form, command-line arguments) is parsed into one of the
//! `New*` requests here. A request that exists is valid, so the roster's create
//! operations never see a blank or malformed field.

use crate::{
    errors::ValidationError,
    models::{EntryKind, FinancialRecord, Meeting, Member, MemberRole, Notice},
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Untyped field-name to value map, as submitted by a form.
pub type FormData = HashMap<String, String>;

type Validated<T> = Result<T, ValidationError>;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn non_blank(field: &'static str, value: &str) -> Validated<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn field<'a>(form: &'a FormData, field: &'static str) -> Validated<&'a str> {
    form.get(field)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::MissingField { field })
}

fn parse_date(field: &'static str, value: &str) -> Validated<NaiveDate> {
    let value = non_blank(field, value)?;
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidValue { field, value })
}

/// Parses an amount, accepting thousands separators (`"400,000"`).
fn parse_amount(value: &str) -> Validated<u64> {
    let value = non_blank("amount", value)?;
    let digits: String = value.chars().filter(|c| *c != ',').collect();
    digits
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidValue {
            field: "amount",
            value,
        })
}

/// Checkbox semantics: present and not explicitly false.
fn parse_flag(form: &FormData, field: &str) -> bool {
    form.get(field).is_some_and(|v| {
        !matches!(
            v.trim().to_lowercase().as_str(),
            "" | "false" | "off" | "0" | "no"
        )
    })
}

/// A validated member registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    name: String,
    role: MemberRole,
    phone_number: String,
}

impl NewMember {
    /// Validates a registration; name and phone number are required.
    pub fn new(name: &str, role: MemberRole, phone_number: &str) -> Validated<Self> {
        Ok(Self {
            name: non_blank("name", name)?,
            role,
            phone_number: non_blank("phoneNumber", phone_number)?,
        })
    }

    /// Builds the record under the given id.
    #[must_use]
    pub fn into_record(self, id: String) -> Member {
        Member {
            id,
            name: self.name,
            role: self.role,
            phone_number: self.phone_number,
        }
    }
}

impl TryFrom<&FormData> for NewMember {
    type Error = ValidationError;

    fn try_from(form: &FormData) -> Validated<Self> {
        let role = field(form, "role")?.parse()?;
        Self::new(field(form, "name")?, role, field(form, "phoneNumber")?)
    }
}

/// A validated meeting to schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    date: NaiveDate,
    location: String,
}

impl NewMeeting {
    /// Validates a meeting; the location is required.
    pub fn new(date: NaiveDate, location: &str) -> Validated<Self> {
        Ok(Self {
            date,
            location: non_blank("location", location)?,
        })
    }

    /// Builds the record under the given id with no answers yet.
    #[must_use]
    pub fn into_record(self, id: String) -> Meeting {
        Meeting {
            id,
            date: self.date,
            location: self.location,
            attendance: BTreeMap::new(),
        }
    }
}

impl TryFrom<&FormData> for NewMeeting {
    type Error = ValidationError;

    fn try_from(form: &FormData) -> Validated<Self> {
        let date = parse_date("date", field(form, "date")?)?;
        Self::new(date, field(form, "location")?)
    }
}

/// A validated notice to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotice {
    title: String,
    body: String,
    important: bool,
}

impl NewNotice {
    /// Validates a notice; title and body are required.
    pub fn new(title: &str, body: &str, important: bool) -> Validated<Self> {
        Ok(Self {
            title: non_blank("title", title)?,
            body: non_blank("content", body)?,
            important,
        })
    }

    /// Builds the record under the given id, dated `date`.
    #[must_use]
    pub fn into_record(self, id: String, date: NaiveDate) -> Notice {
        Notice {
            id,
            title: self.title,
            body: self.body,
            date,
            important: self.important,
        }
    }
}

impl TryFrom<&FormData> for NewNotice {
    type Error = ValidationError;

    fn try_from(form: &FormData) -> Validated<Self> {
        Self::new(
            field(form, "title")?,
            field(form, "content")?,
            parse_flag(form, "isImportant"),
        )
    }
}

/// A validated ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFinancialRecord {
    date: NaiveDate,
    description: String,
    amount: u64,
    kind: EntryKind,
}

impl NewFinancialRecord {
    /// Validates an entry; the description is required. Zero amounts are allowed.
    pub fn new(
        date: NaiveDate,
        description: &str,
        amount: u64,
        kind: EntryKind,
    ) -> Validated<Self> {
        Ok(Self {
            date,
            description: non_blank("description", description)?,
            amount,
            kind,
        })
    }

    /// Builds the record under the given id.
    #[must_use]
    pub fn into_record(self, id: String) -> FinancialRecord {
        FinancialRecord {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
        }
    }
}

impl TryFrom<&FormData> for NewFinancialRecord {
    type Error = ValidationError;

    fn try_from(form: &FormData) -> Validated<Self> {
        let date = parse_date("date", field(form, "date")?)?;
        let amount = parse_amount(field(form, "amount")?)?;
        let kind = field(form, "type")?.parse()?;
        Self::new(date, field(form, "description")?, amount, kind)
    }
}
