//! [`PredictionController`] -- Mode A (double-world, no history replay)
//! client-authoritative prediction with server reconciliation (spec.md
//! §4.5).
//!
//! Every local tick runs the pipeline once against `predicted_world` with
//! the local player's guessed input. Every confirmed server frame is
//! classified against `confirmed_frame`/`predicted_frame`
//! ([`crate::classification::classify`]); `NoPredictionOk`,
//! `PredictedInputsOk`, and `PredictedInputsMismatch` all take the same
//! action under Mode A -- advance `confirmed_world` with the authoritative
//! input, then unconditionally reclone it into `predicted_world` -- which
//! is what makes Mode A simple: it never replays history, it just throws
//! the prediction away and starts over from the new confirmed state.

use std::collections::BTreeMap;

use lockstep_ecs::world::World;
use lockstep_sim::input::FrameData;
use lockstep_sim::pipeline::Pipeline;

use crate::classification::{classify, FrameClassification};
use crate::mailbox::Mailbox;
use crate::transport::{TransportAdapter, TransportSink};
use crate::NetError;

/// Everything observed during one call to [`PredictionController::run_tick`],
/// for host-side diagnostics (logging, UI "desync" indicators, metrics).
#[derive(Debug, Clone)]
pub struct TickReport {
    /// One classification per server frame drained from the mailbox this
    /// tick, in the order they were applied (ascending frame number).
    pub classifications: Vec<(u64, FrameClassification)>,
    pub predicted_frame: u64,
    pub confirmed_frame: u64,
}

pub struct PredictionController<T: TransportAdapter> {
    confirmed_world: World,
    predicted_world: World,
    confirmed_frame: u64,
    predicted_frame: u64,
    predicted_index: u64,
    /// Local input this controller predicted for every frame past
    /// `confirmed_frame`, keyed by frame number, so a later server frame
    /// can be compared against what was actually simulated at the time.
    /// Entries at or below `confirmed_frame` are pruned on every advance.
    predicted_inputs_by_frame: BTreeMap<u64, FrameData>,
    mailbox: Mailbox<(u64, FrameData)>,
    pipeline: Pipeline,
    transport: T,
    room_id: String,
    random_seed: u64,
    player_ids: Vec<u8>,
}

impl<T: TransportAdapter> PredictionController<T> {
    /// `world` seeds both `confirmed_world` and `predicted_world`
    /// identically; `pipeline` drives both (Mode A never runs two
    /// different pipelines). `mailbox_capacity` bounds how many
    /// undelivered server frames the controller buffers before it starts
    /// dropping them (spec.md §5).
    pub fn new(world: World, pipeline: Pipeline, transport: T, mailbox_capacity: usize) -> Self {
        PredictionController {
            predicted_world: world.clone_world(),
            confirmed_world: world,
            confirmed_frame: 0,
            predicted_frame: 0,
            predicted_index: 0,
            predicted_inputs_by_frame: BTreeMap::new(),
            mailbox: Mailbox::new(mailbox_capacity),
            pipeline,
            transport,
            room_id: String::new(),
            random_seed: 0,
            player_ids: Vec::new(),
        }
    }

    pub fn confirmed_frame(&self) -> u64 {
        self.confirmed_frame
    }

    pub fn predicted_frame(&self) -> u64 {
        self.predicted_frame
    }

    pub fn predicted_index(&self) -> u64 {
        self.predicted_index
    }

    pub fn confirmed_world(&self) -> &World {
        &self.confirmed_world
    }

    pub fn predicted_world(&self) -> &World {
        &self.predicted_world
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    pub fn player_ids(&self) -> &[u8] {
        &self.player_ids
    }

    /// BLAKE3 digest of the confirmed world's encoded state -- the
    /// controller's generalization of the teacher's single-world
    /// `EngineSnapshot::hash`, used for cross-peer desync diagnostics and
    /// replay checkpoints.
    pub fn state_hash(&self) -> Result<[u8; 32], NetError> {
        Ok(lockstep_ecs::snapshot::state_hash(&self.confirmed_world)?)
    }

    /// Run one local tick: drain and apply any server frames queued since
    /// the last call, then advance `predicted_world` one tick with
    /// `local_input` and submit it to the transport.
    pub fn run_tick(&mut self, local_input: FrameData) -> TickReport {
        let mut queued = self.mailbox.drain();
        queued.sort_by_key(|(frame_number, _)| *frame_number);

        let classifications =
            queued.into_iter().map(|(frame_number, inputs)| (frame_number, self.apply_server_frame(frame_number, inputs))).collect();

        self.predicted_frame += 1;
        self.predicted_index += 1;
        self.predicted_inputs_by_frame.insert(self.predicted_frame, local_input.clone());
        self.pipeline.run_tick(&mut self.predicted_world, std::slice::from_ref(&local_input));
        self.transport.submit_input(self.predicted_frame, &local_input);

        TickReport { classifications, predicted_frame: self.predicted_frame, confirmed_frame: self.confirmed_frame }
    }

    /// Classify and act on one confirmed server frame (spec.md §4.5's
    /// classification table, Mode A's action column).
    fn apply_server_frame(&mut self, frame_number: u64, inputs: FrameData) -> FrameClassification {
        let predicted = self.predicted_inputs_by_frame.get(&frame_number);
        let classification = classify(self.confirmed_frame, self.predicted_frame, frame_number, predicted, &inputs);

        match classification {
            FrameClassification::Duplicate => {
                tracing::trace!(frame_number, confirmed = self.confirmed_frame, "duplicate server frame ignored");
            }
            FrameClassification::NoPredictionGap | FrameClassification::PredictedGap => {
                tracing::debug!(frame_number, confirmed = self.confirmed_frame, "frame gap, requesting loss recovery");
                self.transport.request_loss_from(self.confirmed_frame);
            }
            FrameClassification::PredictedInputsMismatch => {
                tracing::warn!(frame_number, "misprediction, rolling back predicted world to confirmed state");
                self.advance_confirmed(frame_number, inputs);
            }
            FrameClassification::NoPredictionOk | FrameClassification::PredictedInputsOk => {
                self.advance_confirmed(frame_number, inputs);
            }
        }

        classification
    }

    /// Mode A's uniform advance action: run the authoritative input
    /// through `confirmed_world`, then unconditionally reclone it into
    /// `predicted_world` -- no partial replay, no history kept beyond
    /// what [`Self::predicted_inputs_by_frame`] needs for the next
    /// comparison.
    fn advance_confirmed(&mut self, frame_number: u64, inputs: FrameData) {
        self.pipeline.run_tick(&mut self.confirmed_world, std::slice::from_ref(&inputs));
        self.confirmed_frame = frame_number;
        self.predicted_world = self.confirmed_world.clone_world();
        self.predicted_frame = frame_number;
        self.predicted_index = 1;
        self.predicted_inputs_by_frame.retain(|&f, _| f > frame_number);
    }
}

impl<T: TransportAdapter> TransportSink for PredictionController<T> {
    fn deliver_server_frame(&mut self, frame_number: u64, inputs: FrameData) {
        if self.mailbox.try_push((frame_number, inputs)).is_err() {
            tracing::warn!(frame_number, "mailbox full, dropping server frame");
        }
    }

    fn deliver_game_start(&mut self, room_id: String, random_seed: u64, player_ids: Vec<u8>) {
        self.room_id = room_id;
        self.random_seed = random_seed;
        self.player_ids = player_ids;
    }

    fn deliver_late_frames(&mut self, frames: Vec<(u64, FrameData)>) {
        for (frame_number, inputs) in frames {
            self.deliver_server_frame(frame_number, inputs);
        }
    }
}
