//! Roster controller - the single owner of in-memory club state.
//!
//! All mutations go through [`Roster`]. Each successful mutation writes the affected
//! collection (and only that one) to the store, then publishes a [`RosterChange`] to
//! subscribers so views can refresh without reaching into shared state.

use crate::{
    core::{
        bootstrap::{self, BootstrapOutcome, ConfirmAdoption},
        forms::{NewFinancialRecord, NewMeeting, NewMember, NewNotice},
        location::Location,
        snapshot,
        store::{KeyValueStore, RosterStore},
    },
    errors::{Error, Result},
    models::{
        AttendanceStatus, CollectionKind, FinancialRecord, Meeting, Member, Notice, RosterData,
        new_id,
    },
};
use chrono::{Local, NaiveDate};
use tokio::sync::broadcast;
use tracing::{debug, info};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A change published after a mutation has been applied and saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterChange {
    /// A record was added
    Created {
        /// Collection that grew
        kind: CollectionKind,
        /// Id of the new record
        id: String,
    },
    /// A record was removed
    Deleted {
        /// Collection that shrank
        kind: CollectionKind,
        /// Id of the removed record
        id: String,
    },
    /// An attendance answer was recorded
    AttendanceSet {
        /// Meeting the answer belongs to
        meeting_id: String,
        /// Member who answered
        member_id: String,
        /// The answer
        status: AttendanceStatus,
    },
}

/// The club roster and its persistence.
#[derive(Debug)]
pub struct Roster<S> {
    store: RosterStore<S>,
    data: RosterData,
    changes: broadcast::Sender<RosterChange>,
}

impl<S: KeyValueStore> Roster<S> {
    /// Wraps already-loaded data. Use [`Roster::open`] to run the startup bootstrap.
    pub fn new(store: RosterStore<S>, data: RosterData) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            store,
            data,
            changes,
        }
    }

    /// Bootstraps the roster from a share link or the store.
    ///
    /// An adopted snapshot is written back to the store right away, subject to the
    /// store's empty-write policy.
    pub async fn open<L, C>(
        store: RosterStore<S>,
        location: &mut L,
        param: &str,
        confirm: C,
    ) -> Result<(Self, BootstrapOutcome)>
    where
        L: Location,
        C: ConfirmAdoption,
    {
        let (data, outcome) = bootstrap::bootstrap(&store, location, param, confirm).await;
        let roster = Self::new(store, data);

        if outcome == BootstrapOutcome::AdoptedFromLink {
            roster.store.save_all(&roster.data).await?;
            info!("Persisted adopted roster");
        }

        Ok((roster, outcome))
    }

    /// Current state of all four collections.
    pub const fn data(&self) -> &RosterData {
        &self.data
    }

    /// Registered members.
    pub fn members(&self) -> &[Member] {
        &self.data.members
    }

    /// Notices, newest first.
    pub fn notices(&self) -> &[Notice] {
        &self.data.notices
    }

    /// Ledger entries, newest first.
    pub fn finances(&self) -> &[FinancialRecord] {
        &self.data.finances
    }

    /// Scheduled meetings.
    pub fn meetings(&self) -> &[Meeting] {
        &self.data.meetings
    }

    /// Looks up a meeting by id.
    pub fn meeting(&self, id: &str) -> Option<&Meeting> {
        self.data.meetings.iter().find(|m| m.id == id)
    }

    /// The persistent store backing this roster.
    pub const fn store(&self) -> &RosterStore<S> {
        &self.store
    }

    /// Income minus expenses.
    pub fn total_balance(&self) -> i64 {
        self.data.total_balance()
    }

    /// Receives every change applied from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterChange> {
        self.changes.subscribe()
    }

    /// Share token for the current state.
    pub fn share_token(&self) -> Result<String> {
        snapshot::encode(&self.data)
    }

    /// Share link for the current state.
    pub fn share_url(&self, base: &str, param: &str) -> Result<String> {
        snapshot::share_url(base, param, &self.data)
    }

    async fn commit(&self, kind: CollectionKind, change: RosterChange) -> Result<()> {
        self.store.save_from(kind, &self.data).await?;
        debug!(?change, "Roster changed");
        // No subscribers is fine.
        let _ = self.changes.send(change);
        Ok(())
    }

    /// Registers a member at the end of the member list.
    pub async fn create_member(&mut self, request: NewMember) -> Result<Member> {
        let member = request.into_record(new_id());
        self.data.members.push(member.clone());
        info!(id = %member.id, name = %member.name, "Member registered");

        self.commit(
            CollectionKind::Members,
            RosterChange::Created {
                kind: CollectionKind::Members,
                id: member.id.clone(),
            },
        )
        .await?;
        Ok(member)
    }

    /// Schedules a meeting at the end of the meeting list.
    pub async fn create_meeting(&mut self, request: NewMeeting) -> Result<Meeting> {
        let meeting = request.into_record(new_id());
        self.data.meetings.push(meeting.clone());
        info!(id = %meeting.id, date = %meeting.date, "Meeting scheduled");

        self.commit(
            CollectionKind::Meetings,
            RosterChange::Created {
                kind: CollectionKind::Meetings,
                id: meeting.id.clone(),
            },
        )
        .await?;
        Ok(meeting)
    }

    /// Posts a notice dated today at the front of the notice list.
    pub async fn create_notice(&mut self, request: NewNotice) -> Result<Notice> {
        self.create_notice_on(request, Local::now().date_naive()).await
    }

    /// Posts a notice with an explicit date at the front of the notice list.
    pub async fn create_notice_on(
        &mut self,
        request: NewNotice,
        date: NaiveDate,
    ) -> Result<Notice> {
        let notice = request.into_record(new_id(), date);
        self.data.notices.insert(0, notice.clone());
        info!(id = %notice.id, title = %notice.title, "Notice posted");

        self.commit(
            CollectionKind::Notices,
            RosterChange::Created {
                kind: CollectionKind::Notices,
                id: notice.id.clone(),
            },
        )
        .await?;
        Ok(notice)
    }

    /// Records a ledger entry at the front of the ledger.
    pub async fn create_financial_record(
        &mut self,
        request: NewFinancialRecord,
    ) -> Result<FinancialRecord> {
        let record = request.into_record(new_id());
        self.data.finances.insert(0, record.clone());
        info!(
            id = %record.id,
            amount = record.amount,
            kind = %record.kind,
            "Ledger entry recorded"
        );

        self.commit(
            CollectionKind::Finances,
            RosterChange::Created {
                kind: CollectionKind::Finances,
                id: record.id.clone(),
            },
        )
        .await?;
        Ok(record)
    }

    /// Removes the record with `id` from the named collection.
    ///
    /// Returns `false`, without saving, when no record has that id. Deleting a member
    /// leaves their attendance entries in place.
    pub async fn delete_by_id(&mut self, kind: CollectionKind, id: &str) -> Result<bool> {
        let before = self.data.len_of(kind);
        match kind {
            CollectionKind::Members => self.data.members.retain(|r| r.id != id),
            CollectionKind::Notices => self.data.notices.retain(|r| r.id != id),
            CollectionKind::Finances => self.data.finances.retain(|r| r.id != id),
            CollectionKind::Meetings => self.data.meetings.retain(|r| r.id != id),
        }

        if self.data.len_of(kind) == before {
            debug!(collection = %kind, id, "Nothing to delete");
            return Ok(false);
        }

        info!(collection = %kind, id, "Record deleted");
        self.commit(
            kind,
            RosterChange::Deleted {
                kind,
                id: id.to_string(),
            },
        )
        .await?;
        Ok(true)
    }

    /// Records `member_id`'s answer for one meeting, leaving every other entry as is.
    ///
    /// The member id is not checked against the roster.
    pub async fn set_attendance(
        &mut self,
        meeting_id: &str,
        member_id: &str,
        status: AttendanceStatus,
    ) -> Result<()> {
        let meeting = self
            .data
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting_id)
            .ok_or_else(|| Error::MeetingNotFound {
                id: meeting_id.to_string(),
            })?;
        meeting.attendance.insert(member_id.to_string(), status);

        self.commit(
            CollectionKind::Meetings,
            RosterChange::AttendanceSet {
                meeting_id: meeting_id.to_string(),
                member_id: member_id.to_string(),
                status,
            },
        )
        .await
    }
}
