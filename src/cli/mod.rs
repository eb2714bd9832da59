//! Command-line front end - argument parsing and command handlers.
//!
//! Every invocation bootstraps the roster (from a share link for `show --link`,
//! otherwise from the store), runs one command, and exits. User mistakes such as a
//! blank field or an unknown meeting are reported with a ❌ line rather than as a
//! process failure.

/// Terminal yes/no prompts
pub mod prompt;
/// Text rendering of roster views
pub mod render;

use crate::{
    clients::GeminiClient,
    config::AppConfig,
    core::{
        BootstrapOutcome, InboundLink, KeyValueStore, Roster, RosterStore,
        assistant::{self, AnalysisPanel},
        forms::{FormData, NewFinancialRecord, NewMeeting, NewMember, NewNotice},
        ledger,
        location::AddressBar,
    },
    errors::{Error, Result},
    models::{AttendanceStatus, CollectionKind, RosterData},
};
use clap::{Args, Parser, Subcommand};
use tracing::info;

/// Roster, attendance, notices and dues for a small club.
#[derive(Debug, Parser)]
#[command(name = "clubhouse", version, about)]
pub struct Cli {
    /// Keep data in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard, optionally adopting data from a share link
    Show {
        /// Share link received from another device
        #[arg(long)]
        link: Option<String>,
        /// Adopt the link's data without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// List one collection (members, meetings, notices, finances)
    List {
        /// Collection to list
        kind: CollectionKind,
    },
    /// Add a record
    #[command(subcommand)]
    Add(AddCommand),
    /// Record a member's answer for a meeting
    Attend {
        /// Meeting id
        meeting: String,
        /// Member id
        member: String,
        /// attending, absent or pending
        status: AttendanceStatus,
    },
    /// Delete a record by id
    Delete {
        /// Collection holding the record
        kind: CollectionKind,
        /// Record id
        id: String,
        /// Delete without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Print a link that carries all current data
    Share,
    /// Ask the text service to summarize the ledger
    Analyze,
    /// Ask the text service to draft a notice
    Draft {
        /// What the notice is about
        topic: String,
    },
}

/// Records that can be added.
#[derive(Debug, Subcommand)]
pub enum AddCommand {
    /// Register a member
    Member(MemberArgs),
    /// Schedule a meeting
    Meeting(MeetingArgs),
    /// Post a notice
    Notice(NoticeArgs),
    /// Record a ledger entry
    Finance(FinanceArgs),
}

/// Fields of a new member.
#[derive(Debug, Args)]
pub struct MemberArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Chair, Secretary or Member
    #[arg(long, default_value = "Member")]
    pub role: String,
    /// Phone number
    #[arg(long)]
    pub phone: String,
}

/// Fields of a new meeting.
#[derive(Debug, Args)]
pub struct MeetingArgs {
    /// Date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// Venue
    #[arg(long)]
    pub location: String,
}

/// Fields of a new notice.
#[derive(Debug, Args)]
pub struct NoticeArgs {
    /// Headline
    #[arg(long)]
    pub title: String,
    /// Body text
    #[arg(long)]
    pub body: String,
    /// Pin the notice as important
    #[arg(long)]
    pub important: bool,
}

/// Fields of a new ledger entry.
#[derive(Debug, Args)]
pub struct FinanceArgs {
    /// Date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// What the money was for
    #[arg(long)]
    pub description: String,
    /// Amount in whole currency units, e.g. 400,000
    #[arg(long)]
    pub amount: String,
    /// income or expense
    #[arg(long = "type")]
    pub kind: String,
}

fn form<const N: usize>(fields: [(&str, &str); N]) -> FormData {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl AddCommand {
    /// The command's fields as submitted form data.
    #[must_use]
    pub fn to_form(&self) -> FormData {
        match self {
            Self::Member(a) => form([
                ("name", a.name.as_str()),
                ("role", a.role.as_str()),
                ("phoneNumber", a.phone.as_str()),
            ]),
            Self::Meeting(a) => form([
                ("date", a.date.as_str()),
                ("location", a.location.as_str()),
            ]),
            Self::Notice(a) => {
                let mut data = form([("title", a.title.as_str()), ("content", a.body.as_str())]);
                if a.important {
                    data.insert("isImportant".to_string(), "on".to_string());
                }
                data
            }
            Self::Finance(a) => form([
                ("date", a.date.as_str()),
                ("description", a.description.as_str()),
                ("amount", a.amount.as_str()),
                ("type", a.kind.as_str()),
            ]),
        }
    }
}

/// Whether an error is the user's to fix rather than a system failure.
const fn is_user_error(error: &Error) -> bool {
    matches!(error, Error::Validation(_) | Error::MeetingNotFound { .. })
}

/// Runs one command against the given store.
pub async fn execute<S: KeyValueStore>(
    command: Command,
    store: RosterStore<S>,
    config: &AppConfig,
) -> Result<()> {
    let (address, assume_yes) = match &command {
        Command::Show {
            link: Some(link),
            yes,
        } => (link.as_str(), *yes),
        _ => (config.share_base_url.as_str(), false),
    };
    let mut location = AddressBar::parse(address)?;

    let (mut roster, outcome) = Roster::open(
        store,
        &mut location,
        &config.snapshot_param,
        |incoming: &RosterData| assume_yes || prompt::confirm_adoption(incoming),
    )
    .await?;

    match outcome {
        BootstrapOutcome::AdoptedFromLink => {
            println!("✅ Adopted shared data. Address is now {}", location.href()?);
        }
        BootstrapOutcome::LoadedFromStore(InboundLink::Malformed) => {
            println!("❌ The share link could not be read; showing your own data.");
        }
        BootstrapOutcome::LoadedFromStore(InboundLink::Declined | InboundLink::Absent) => {}
    }

    match run_command(command, &mut roster, config).await {
        Err(e) if is_user_error(&e) => {
            println!("❌ {e}");
            Ok(())
        }
        other => other,
    }
}

async fn run_command<S: KeyValueStore>(
    command: Command,
    roster: &mut Roster<S>,
    config: &AppConfig,
) -> Result<()> {
    match command {
        Command::Show { .. } => {
            print!("{}", render::dashboard(&ledger::dashboard(roster.data())));
        }
        Command::List { kind } => {
            let text = match kind {
                CollectionKind::Members => render::members(roster.members()),
                CollectionKind::Meetings => render::meetings(roster.meetings(), roster.members()),
                CollectionKind::Notices => render::notices(roster.notices()),
                CollectionKind::Finances => render::ledger(roster.finances()),
            };
            print!("{text}");
        }
        Command::Add(add) => add_record(&add, roster).await?,
        Command::Attend {
            meeting,
            member,
            status,
        } => {
            roster.set_attendance(&meeting, &member, status).await?;
            println!("✅ Marked {member} as {status} for meeting {meeting}");
        }
        Command::Delete { kind, id, yes } => {
            if !yes && !prompt::ask_yes_no(&format!("Delete {kind} record {id}?")) {
                println!("Cancelled.");
                return Ok(());
            }
            if roster.delete_by_id(kind, &id).await? {
                println!("✅ Deleted {kind} record {id}");
            } else {
                println!("❌ No {kind} record with id {id}");
            }
        }
        Command::Share => {
            println!(
                "{}",
                roster.share_url(&config.share_base_url, &config.snapshot_param)?
            );
        }
        Command::Analyze => {
            let Some(client) = text_client(config)? else {
                return Ok(());
            };
            let panel = AnalysisPanel::new();
            let text = panel.run_analysis(&client, roster.finances()).await;
            println!("✨ Ledger analysis\n\n{text}");
        }
        Command::Draft { topic } => {
            let Some(client) = text_client(config)? else {
                return Ok(());
            };
            match assistant::draft_notice(&client, &topic).await {
                Ok(text) => println!("{text}"),
                Err(Error::Collaborator { message }) => {
                    tracing::warn!("Notice draft failed: {message}");
                    println!("❌ The text service could not draft a notice right now.");
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

async fn add_record<S: KeyValueStore>(add: &AddCommand, roster: &mut Roster<S>) -> Result<()> {
    let data = add.to_form();
    match add {
        AddCommand::Member(_) => {
            let member = roster.create_member(NewMember::try_from(&data)?).await?;
            println!("✅ Registered {} (id: {})", member.name, member.id);
        }
        AddCommand::Meeting(_) => {
            let meeting = roster.create_meeting(NewMeeting::try_from(&data)?).await?;
            println!(
                "✅ Scheduled {} at {} (id: {})",
                meeting.date, meeting.location, meeting.id
            );
        }
        AddCommand::Notice(_) => {
            let notice = roster.create_notice(NewNotice::try_from(&data)?).await?;
            println!("✅ Posted '{}' (id: {})", notice.title, notice.id);
        }
        AddCommand::Finance(_) => {
            let record = roster
                .create_financial_record(NewFinancialRecord::try_from(&data)?)
                .await?;
            println!(
                "✅ Recorded {} of {} for '{}' (id: {})",
                record.kind,
                ledger::format_amount(record.signed_amount()),
                record.description,
                record.id
            );
        }
    }
    info!(balance = roster.total_balance(), "Record added");
    Ok(())
}

fn text_client(config: &AppConfig) -> Result<Option<GeminiClient>> {
    let Some(api_key) = config.gemini_api_key.clone() else {
        println!("❌ GEMINI_API_KEY is not set; the text service is unavailable.");
        return Ok(None);
    };
    GeminiClient::new(&config.gemini, api_key).map(Some)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::MemoryStore;
    use crate::test_utils::sample_roster;

    fn config() -> AppConfig {
        AppConfig {
            share_base_url: "https://club.example/".to_string(),
            ..AppConfig::default()
        }
    }

    async fn seeded_store() -> Result<RosterStore<MemoryStore>> {
        let store = RosterStore::new(MemoryStore::new());
        store.save_all(&sample_roster()).await?;
        Ok(store)
    }

    #[test]
    fn test_parse_add_member() {
        let cli = Cli::try_parse_from([
            "clubhouse", "add", "member", "--name", "Jung", "--role", "secretary", "--phone",
            "010-1111-2222",
        ])
        .unwrap();
        let Command::Add(add) = cli.command else {
            panic!("expected add command");
        };
        let form = add.to_form();
        assert_eq!(form["name"], "Jung");
        assert_eq!(form["phoneNumber"], "010-1111-2222");
    }

    #[test]
    fn test_parse_typed_arguments() {
        let cli =
            Cli::try_parse_from(["clubhouse", "attend", "m1", "3", "absent", "--ephemeral"])
                .unwrap();
        assert!(cli.ephemeral);
        assert!(matches!(
            cli.command,
            Command::Attend {
                status: AttendanceStatus::Absent,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["clubhouse", "list", "caddies"]).is_err());
    }

    #[tokio::test]
    async fn test_add_finance_through_form() -> Result<()> {
        let store = seeded_store().await?;
        let config = config();
        let mut location = AddressBar::parse(&config.share_base_url)?;
        let (mut roster, _) =
            Roster::open(store, &mut location, "data", |_: &RosterData| false).await?;

        let add = AddCommand::Finance(FinanceArgs {
            date: "2024-04-01".to_string(),
            description: "Green fees".to_string(),
            amount: "50,000".to_string(),
            kind: "expense".to_string(),
        });
        add_record(&add, &mut roster).await?;

        assert_eq!(roster.finances()[0].description, "Green fees");
        assert_eq!(roster.total_balance(), 200_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_errors_are_reported_not_raised() -> Result<()> {
        let backend = MemoryStore::new();
        RosterStore::new(&backend)
            .save(CollectionKind::Members, &sample_roster().members)
            .await?;

        let command = Command::Attend {
            meeting: "missing".to_string(),
            member: "1".to_string(),
            status: AttendanceStatus::Attending,
        };
        execute(command, RosterStore::new(&backend), &config()).await?;

        assert_eq!(backend.raw(CollectionKind::Meetings.storage_key()), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_show_adopts_link_with_yes() -> Result<()> {
        let config = config();
        let mut shared = sample_roster();
        shared.members.truncate(1);
        let link = crate::core::snapshot::share_url(
            &config.share_base_url,
            &config.snapshot_param,
            &shared,
        )?;

        let backend = MemoryStore::new();
        RosterStore::new(&backend).save_all(&sample_roster()).await?;

        execute(
            Command::Show {
                link: Some(link),
                yes: true,
            },
            RosterStore::new(&backend),
            &config,
        )
        .await?;

        assert_eq!(RosterStore::new(&backend).load().await, shared);
        Ok(())
    }

    #[test]
    fn test_text_client_needs_api_key() -> Result<()> {
        let mut config = config();
        config.gemini_api_key = None;
        assert!(text_client(&config)?.is_none());

        config.gemini_api_key = Some("key".to_string());
        assert!(text_client(&config)?.is_some());
        Ok(())
    }
}
