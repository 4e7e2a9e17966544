use crate::error::ApiError;
use crate::events::EventLog;
use crate::layout::ViewState;
use crate::models::FleetSnapshot;

/// Handed out when a load cycle starts and given back with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub token: String,
}

/// What a finished load did to the fleet data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new snapshot replaced the old one.
    Applied,
    /// The token was rejected. Fleet data is cleared; the session should expire.
    Expired,
    /// The load failed. The previous snapshot, if any, is kept.
    Failed,
    /// The result belongs to a session that has since ended and was dropped.
    Discarded,
}

/// In-memory fleet data of the console and its load lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetData {
    pub snapshot: Option<FleetSnapshot>,
    pub error: Option<ApiError>,
    pub loading: bool,
    pub events: EventLog,
    generation: u64,
}

impl FleetData {
    /// An authenticated console with nothing loaded and no pending failure
    /// fetches right away. This covers both a fresh login and a token
    /// restored at startup.
    pub fn needs_first_load(&self, authenticated: bool) -> bool {
        authenticated && !self.loading && self.snapshot.is_none() && self.error.is_none()
    }

    /// Start a load cycle. `None` when there is no token or a cycle is
    /// already in flight.
    pub fn begin_load(&mut self, token: Option<&str>) -> Option<LoadTicket> {
        if self.loading {
            return None;
        }
        let token = token.filter(|t| !t.is_empty())?;
        self.loading = true;
        Some(LoadTicket {
            generation: self.generation,
            token: token.to_string(),
        })
    }

    /// Apply the result of the cycle started with `ticket`.
    ///
    /// `current_token` is the session token at the time the result arrives. A
    /// result for another token, or from before a reset, is dropped.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        current_token: Option<&str>,
        result: Result<FleetSnapshot, ApiError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            return LoadOutcome::Discarded;
        }
        self.loading = false;
        if current_token != Some(ticket.token.as_str()) {
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(next) => {
                self.events.observe(self.snapshot.as_ref(), &next);
                self.snapshot = Some(next);
                self.error = None;
                LoadOutcome::Applied
            }
            Err(e) if e.is_unauthorized() => {
                self.reset();
                LoadOutcome::Expired
            }
            Err(e) => {
                self.error = Some(e);
                LoadOutcome::Failed
            }
        }
    }

    /// Dismiss a failed first load so it can be tried again.
    pub fn retry(&mut self) {
        self.error = None;
    }

    /// Drop everything, as on sign-out. Loads still in flight are discarded
    /// when they finish.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = FleetData {
            generation,
            ..Default::default()
        };
    }

    pub fn view(&self, authenticated: bool) -> ViewState {
        ViewState::derive(
            authenticated,
            self.loading,
            self.error.as_ref().map(|e| e.to_string()).as_deref(),
            self.snapshot.is_some(),
        )
    }
}
