//! Reconciliation bootstrap - picks the source of truth at startup.
//!
//! An inbound share link wins only if it decodes and the user agrees to overwrite
//! their data; otherwise the roster comes from the persistent store. The decision is
//! made once, with no retries, and a malformed token counts as no token.

use crate::{
    core::{
        location::Location,
        snapshot,
        store::{KeyValueStore, RosterStore},
    },
    models::RosterData,
};
use tracing::{info, warn};

/// Asks the user whether a shared roster should replace theirs.
pub trait ConfirmAdoption {
    /// Returns `true` to adopt `incoming` and overwrite local data.
    fn confirm(&mut self, incoming: &RosterData) -> bool;
}

impl<F> ConfirmAdoption for F
where
    F: FnMut(&RosterData) -> bool,
{
    fn confirm(&mut self, incoming: &RosterData) -> bool {
        self(incoming)
    }
}

/// What happened to an inbound link that was not adopted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundLink {
    /// The address carried no snapshot parameter
    Absent,
    /// The parameter was present but did not decode
    Malformed,
    /// The snapshot decoded but the user kept their own data
    Declined,
}

/// Where the starting roster came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The shared snapshot was adopted; the store was not read
    AdoptedFromLink,
    /// The roster was loaded from the store
    LoadedFromStore(InboundLink),
}

/// Runs the startup decision.
///
/// # Arguments
/// * `store` - Persistent store to fall back to
/// * `location` - Current address; the snapshot parameter is stripped from it once
///   the user has decided
/// * `param` - Name of the snapshot query parameter
/// * `confirm` - Prompt shown when a snapshot decodes
pub async fn bootstrap<S, L, C>(
    store: &RosterStore<S>,
    location: &mut L,
    param: &str,
    mut confirm: C,
) -> (RosterData, BootstrapOutcome)
where
    S: KeyValueStore,
    L: Location,
    C: ConfirmAdoption,
{
    let inbound = match location.query_param(param) {
        None => InboundLink::Absent,
        Some(token) => match snapshot::decode(&token) {
            Err(e) => {
                warn!("Ignoring malformed share link: {e}");
                InboundLink::Malformed
            }
            Ok(incoming) => {
                let adopt = confirm.confirm(&incoming);
                location.strip_query_param(param);
                if adopt {
                    info!(
                        members = incoming.members.len(),
                        meetings = incoming.meetings.len(),
                        "Adopted roster from share link"
                    );
                    return (incoming, BootstrapOutcome::AdoptedFromLink);
                }
                info!("Share link declined, keeping local roster");
                InboundLink::Declined
            }
        },
    };

    let data = store.load().await;
    info!(members = data.members.len(), "Loaded roster from store");
    (data, BootstrapOutcome::LoadedFromStore(inbound))
}
