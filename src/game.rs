//! Core game logic and state management
//!
//! This module contains the session record ([`GameState`]) and the
//! [`Game`] state machine that drives it: `Idle` → `Playing` →
//! `Finished`, with a restart path back into `Playing`.
//!
//! Two event sources can complete a round: the player answering and the
//! countdown expiring. Both go through [`Game::commit`], which claims the
//! round's single submission slot before anything else happens, so at
//! most one result is ever recorded per round.

use std::{
    fmt::{Debug, Display},
    time::Duration,
};

use enum_map::EnumMap;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use web_time::SystemTime;

use super::{
    config::Options,
    generator::Generator,
    round::{self, Round, RoundKind, RoundView},
    session::Tunnel,
    summary::{self, KindStats, Summary},
    timer::{self, AlarmMessage, RoundTimer, TickOutcome},
};

/// Errors raised when creating a game
#[derive(Debug, Error)]
pub enum Error {
    /// The options failed validation
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] garde::Report),
    /// The custom deck is unusable
    #[error("invalid deck: {0}")]
    InvalidDeck(#[from] round::Error),
}

/// A unique identifier for a game session, used to correlate log lines
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// No rounds loaded, waiting for a start command
    #[default]
    Idle,
    /// A round is open and its countdown is running
    Playing,
    /// Every round has been consumed
    Finished,
}

/// Outcome of one round
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Index of the round within the session
    pub round_index: usize,
    /// Whether the player chose the correct option
    pub correct: bool,
    /// Time spent on the round
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub time_taken: Duration,
}

impl RoundResult {
    /// Creates a result record
    pub fn new(round_index: usize, correct: bool, time_taken: Duration) -> Self {
        Self {
            round_index,
            correct,
            time_taken,
        }
    }
}

/// The session record
///
/// Invariants: `current_round <= total_rounds`; while playing,
/// `results.len() == current_round`; once finished,
/// `results.len() == total_rounds`; always `score <= results.len()`.
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    status: Status,
    current_round: usize,
    total_rounds: usize,
    score: usize,
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    total_time: Duration,
    results: Vec<RoundResult>,
    started_at: Option<SystemTime>,
}

impl GameState {
    /// Starts a fresh session of `total_rounds` rounds
    ///
    /// A session without rounds is finished immediately.
    pub fn begin(&mut self, total_rounds: usize, now: SystemTime) {
        *self = Self {
            status: if total_rounds == 0 {
                Status::Finished
            } else {
                Status::Playing
            },
            total_rounds,
            started_at: Some(now),
            ..Self::default()
        };
    }

    /// Records the result of the current round and moves on
    ///
    /// # Returns
    ///
    /// `false`, leaving the state untouched, if the session is not
    /// playing or `result` is not for the current round
    pub fn advance(&mut self, result: RoundResult) -> bool {
        if self.status != Status::Playing || result.round_index != self.current_round {
            return false;
        }

        self.score += usize::from(result.correct);
        self.total_time += result.time_taken;
        self.results.push(result);

        if self.current_round + 1 < self.total_rounds {
            self.current_round += 1;
        } else {
            self.status = Status::Finished;
            self.current_round = self.total_rounds;
        }

        true
    }

    /// Returns the session status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the index of the current round (equal to the total once finished)
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Returns the number of rounds in the session
    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    /// Returns the number of correct answers so far
    pub fn score(&self) -> usize {
        self.score
    }

    /// Returns the time spent across all completed rounds
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Returns the results recorded so far, in round order
    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    /// Returns when the session started
    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }
}

/// Everything the results screen shows
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMessage {
    /// Correct answers
    pub score: usize,
    /// Rounds played
    pub total_rounds: usize,
    /// Time spent across all rounds
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub total_time: Duration,
    /// Rating and rank
    pub summary: Summary,
    /// Correct and total rounds per kind
    pub breakdown: EnumMap<RoundKind, KindStats>,
}

/// Update messages sent to the view as the session progresses
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// A new round is open
    RoundAnnouncement {
        /// Index of the round (0-based)
        index: usize,
        /// Total number of rounds in the session
        count: usize,
        /// The round, without its answer
        round: RoundView,
        /// Time limit of the round
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        duration: Duration,
    },
    /// A round was completed, by answer or by timeout
    RoundOutcome {
        /// The recorded result
        result: RoundResult,
        /// The correct answer, revealed now that the round is closed
        answer: Option<String>,
        /// Score after this round
        score: usize,
    },
    /// The session is finished
    Summary(SummaryMessage),
}

/// Synchronization messages for a view that mounts mid-session
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Waiting for the start command
    Idle,
    /// A round is open
    Round {
        /// Index of the round (0-based)
        index: usize,
        /// Total number of rounds in the session
        count: usize,
        /// The round, without its answer
        round: RoundView,
        /// Time left on the countdown
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
        /// Score so far
        score: usize,
    },
    /// The session is finished
    Summary(SummaryMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The round currently open, with its single submission slot
#[derive(Debug, Clone, Copy)]
struct CurrentRound {
    index: usize,
    submitted: bool,
}

impl CurrentRound {
    fn new(index: usize) -> Self {
        Self {
            index,
            submitted: false,
        }
    }

    /// Marks the round as submitted, returning `false` if it already was
    fn claim(&mut self) -> bool {
        !std::mem::replace(&mut self.submitted, true)
    }
}

/// The game session state machine
///
/// The game owns at most one [`RoundTimer`]. Starting a round replaces
/// it, and answering, expiry, reset, teardown, and drop all end it
/// through [`Game::release_timer`].
pub struct Game {
    id: SessionId,
    options: Options,
    generator: Generator,
    /// Rounds of the current session, generated once at start
    rounds: Vec<Round>,
    state: GameState,
    current: Option<CurrentRound>,
    timer: Option<RoundTimer>,
    /// Incremented for every timer started, so stale alarms can be told apart
    epoch: u64,
}

impl Debug for Game {
    /// Custom debug implementation that avoids printing the round list
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.release_timer();
    }
}

impl Game {
    /// Creates an idle game drawing rounds from the built-in pool
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if `options` fail validation.
    pub fn new(options: Options) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self::with_generator(options, Generator::new(&options)))
    }

    /// Creates an idle game drawing rounds from a custom deck
    ///
    /// The deck is reshuffled (and cycled if short) on every start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if `options` fail validation and
    /// [`Error::InvalidDeck`] if the deck is empty or holds a broken round.
    pub fn with_deck(options: Options, deck: Vec<Round>) -> Result<Self, Error> {
        options.validate()?;
        round::validate_deck(&deck)?;
        Ok(Self::with_generator(
            options,
            Generator::with_deck(&options, deck),
        ))
    }

    fn with_generator(options: Options, generator: Generator) -> Self {
        Self {
            id: SessionId::new(),
            options,
            generator,
            rounds: Vec::new(),
            state: GameState::default(),
            current: None,
            timer: None,
            epoch: 0,
        }
    }

    /// Returns the session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the session record
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the rounds of the current session
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Returns the open round, if any
    pub fn current_round(&self) -> Option<&Round> {
        self.current.and_then(|current| self.rounds.get(current.index))
    }

    /// Returns the time left on the open round's countdown
    pub fn remaining(&self) -> Option<Duration> {
        self.timer.as_ref().map(RoundTimer::remaining)
    }

    /// Returns the rating of a finished session
    pub fn summary(&self) -> Option<Summary> {
        (self.state.status == Status::Finished).then(|| {
            summary::summarize(
                self.state.score,
                self.state.total_rounds,
                self.state.total_time,
            )
        })
    }

    /// Starts a session from `Idle` or `Finished`
    ///
    /// The state is reset, a fresh round list is generated, and the first
    /// round opens. Ignored while a session is already playing.
    ///
    /// # Arguments
    ///
    /// * `now` - Current time, used as the session and round start
    /// * `schedule_message` - Function to schedule countdown alarms
    /// * `tunnel` - The view to announce the first round to
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for the view
    /// * `S` - Function type for scheduling alarm messages
    pub fn play<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        now: SystemTime,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        if self.state.status == Status::Playing {
            debug!(session = %self.id, "start ignored while playing");
            return;
        }

        self.reset();
        self.rounds = self.generator.generate_rounds(self.options.round_count);
        self.state.begin(self.rounds.len(), now);

        info!(session = %self.id, rounds = self.rounds.len(), "session started");

        self.proceed(now, &mut schedule_message, tunnel);
    }

    /// Abandons whatever is in progress and starts a new session
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for the view
    /// * `S` - Function type for scheduling alarm messages
    pub fn restart<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        now: SystemTime,
        schedule_message: S,
        tunnel: &T,
    ) {
        self.reset();
        self.play(now, schedule_message, tunnel);
    }

    /// Returns to a fresh `Idle` state, cancelling any countdown
    pub fn reset(&mut self) {
        self.release_timer();
        self.current = None;
        self.rounds.clear();
        self.state = GameState::default();

        debug!(session = %self.id, "session reset");
    }

    /// Submits the player's choice for a round
    ///
    /// The elapsed time is measured from the round start and clamped to
    /// the round's time limit.
    ///
    /// # Arguments
    ///
    /// * `round_index` - Index of the round the player answered
    /// * `choice` - Id of the chosen option
    /// * `now` - Current time
    /// * `schedule_message` - Function to schedule countdown alarms
    /// * `tunnel` - The view to report to
    ///
    /// # Returns
    ///
    /// The recorded result, or `None` if the submission lost the race
    /// against the countdown, names a round that is not open, or arrives
    /// outside a session
    pub fn submit_answer<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        round_index: usize,
        choice: &str,
        now: SystemTime,
        mut schedule_message: S,
        tunnel: &T,
    ) -> Option<RoundResult> {
        let time_taken = match &self.timer {
            Some(timer) if timer.round() == round_index => timer.elapsed_at(now),
            _ => {
                debug!(session = %self.id, round = round_index, "submission suppressed");
                return None;
            }
        };

        let correct = self
            .rounds
            .get(round_index)
            .is_some_and(|round| round.is_correct(choice));
        let result = RoundResult::new(round_index, correct, time_taken);

        if !self.commit(result, tunnel) {
            return None;
        }

        self.proceed(now, &mut schedule_message, tunnel);
        Some(result)
    }

    /// Handles a countdown alarm delivered by the host
    ///
    /// Alarms from released timers are dropped. A tick that exhausts the
    /// countdown completes the round as incorrect, with the full time
    /// limit as its time.
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for the view
    /// * `S` - Function type for scheduling alarm messages
    pub fn receive_alarm<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        alarm: AlarmMessage,
        now: SystemTime,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        let Some(timer) = self.timer.as_mut().filter(|timer| timer.owns(&alarm)) else {
            debug!(session = %self.id, ?alarm, "stale alarm dropped");
            return;
        };

        match timer.tick() {
            TickOutcome::Running(remaining) => {
                tunnel.send_message(
                    &timer::UpdateMessage::Countdown {
                        index: timer.round(),
                        remaining,
                    }
                    .into(),
                );
                timer.schedule_next(&mut schedule_message);
            }
            TickOutcome::Expired => {
                let result = RoundResult::new(timer.round(), false, timer.limit());

                info!(session = %self.id, round = result.round_index, "round timed out");

                if self.commit(result, tunnel) {
                    self.proceed(now, &mut schedule_message, tunnel);
                }
            }
        }
    }

    /// Tears the session down when its view goes away
    ///
    /// The game returns to `Idle`, so a later start begins a new session.
    pub fn teardown<T: Tunnel>(&mut self, tunnel: T) {
        self.reset();
        tunnel.close();

        debug!(session = %self.id, "session torn down");
    }

    /// Records `result` for the open round
    ///
    /// This is the only place results enter the session record. The
    /// round's submission slot is claimed first and the countdown is
    /// released before the state advances.
    ///
    /// # Returns
    ///
    /// `true` if the result was recorded, `false` if the round was
    /// already submitted or is not the open round
    fn commit<T: Tunnel>(&mut self, result: RoundResult, tunnel: &T) -> bool {
        let Some(current) = self
            .current
            .as_mut()
            .filter(|current| current.index == result.round_index)
        else {
            return false;
        };

        if !current.claim() {
            debug!(session = %self.id, round = result.round_index, "round already submitted");
            return false;
        }

        self.release_timer();

        if !self.state.advance(result) {
            return false;
        }

        debug!(
            session = %self.id,
            round = result.round_index,
            correct = result.correct,
            time_ms = result.time_taken.as_millis() as u64,
            "result recorded"
        );

        tunnel.send_message(
            &UpdateMessage::RoundOutcome {
                result,
                answer: self
                    .rounds
                    .get(result.round_index)
                    .and_then(Round::answer)
                    .map(str::to_owned),
                score: self.state.score,
            }
            .into(),
        );

        true
    }

    /// Opens the next playable round, or announces the summary once
    /// the session is finished
    ///
    /// Unsupported rounds are completed as incorrect, with zero time,
    /// without being shown.
    fn proceed<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        now: SystemTime,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        while self.state.status == Status::Playing {
            let index = self.state.current_round;
            let Some(round) = self.rounds.get(index) else {
                warn!(session = %self.id, round = index, "round list shorter than session");
                return;
            };

            let kind = round.kind();
            let limit = round.time_limit_or(self.options.time_limit);
            let view = round.view();

            self.current = Some(CurrentRound::new(index));

            if kind == RoundKind::Unsupported {
                warn!(session = %self.id, round = index, "skipping unsupported round");
                self.commit(RoundResult::new(index, false, Duration::ZERO), tunnel);
                continue;
            }

            self.start_timer(index, limit, now, schedule_message);

            tunnel.send_message(
                &UpdateMessage::RoundAnnouncement {
                    index,
                    count: self.state.total_rounds,
                    round: view,
                    duration: limit,
                }
                .into(),
            );
            return;
        }

        if self.state.status == Status::Finished {
            self.current = None;
            self.announce_summary(tunnel);
        }
    }

    /// Replaces any running countdown with a new one for `index`
    fn start_timer<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        index: usize,
        limit: Duration,
        now: SystemTime,
        schedule_message: &mut S,
    ) {
        self.release_timer();
        self.epoch += 1;

        let timer = RoundTimer::start(index, self.epoch, limit, now);
        timer.schedule_next(schedule_message);
        self.timer = Some(timer);

        debug!(session = %self.id, round = index, epoch = self.epoch, "round started");
    }

    /// Ends the running countdown, if any
    ///
    /// Every exit path of a round goes through here. Alarms the host
    /// already scheduled for the released timer are dropped on arrival.
    fn release_timer(&mut self) {
        self.timer = None;
    }

    /// Builds the results screen message from the session record
    fn summary_message(&self) -> SummaryMessage {
        SummaryMessage {
            score: self.state.score,
            total_rounds: self.state.total_rounds,
            total_time: self.state.total_time,
            summary: summary::summarize(
                self.state.score,
                self.state.total_rounds,
                self.state.total_time,
            ),
            breakdown: summary::breakdown(&self.rounds, &self.state.results),
        }
    }

    /// Sends the summary of a finished session
    fn announce_summary<T: Tunnel>(&self, tunnel: &T) {
        let message = self.summary_message();

        info!(
            session = %self.id,
            score = message.score,
            rounds = message.total_rounds,
            rating = message.summary.label,
            "session finished"
        );

        tunnel.send_message(&UpdateMessage::Summary(message).into());
    }

    /// Returns the message a freshly mounted view needs to render the game
    pub fn state_message(&self) -> SyncMessage {
        match self.state.status {
            Status::Idle => SyncMessage::Idle,
            Status::Playing => match (self.current_round(), &self.timer) {
                (Some(round), Some(timer)) => SyncMessage::Round {
                    index: timer.round(),
                    count: self.state.total_rounds,
                    round: round.view(),
                    remaining: timer.remaining(),
                    score: self.state.score,
                },
                _ => SyncMessage::Idle,
            },
            Status::Finished => SyncMessage::Summary(self.summary_message()),
        }
    }

    /// Sends the current state to a view
    pub fn update_session<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message());
    }
}
