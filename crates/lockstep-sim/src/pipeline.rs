//! The fixed, ordered System pipeline (spec.md §4.3).
//!
//! A [`Pipeline`] holds its Systems in registration order and runs them
//! sequentially, once per tick, each observing the mutations of its
//! predecessors. There is no command-buffer indirection: Systems mutate
//! `World` directly, exactly as spec.md's `fn execute(world, inputs)`
//! contract states. Per-System wall-clock timing and a `tracing` span are
//! layered on top for observability only -- removing them changes nothing
//! about the simulation result, only what gets logged.

use std::time::{Duration, Instant};

use lockstep_ecs::world::World;

use crate::input::FrameData;

/// One step of the fixed pipeline. Systems may carry their own
/// configuration as fields (e.g. gravity, sub-step count) set at
/// construction time -- the `execute` signature itself takes nothing but
/// the world and this tick's input, matching spec.md's contract.
pub trait System {
    /// Human-readable name, used for `tracing` spans and diagnostics.
    fn name(&self) -> &'static str;

    /// Run this System's logic for one tick.
    ///
    /// Must not spawn work that outlives the call, read wall-clock time,
    /// or consult OS randomness (spec.md §4.3 rules 2-3). A System that
    /// finds a component or singleton missing skips the affected entity
    /// (or is a no-op) rather than erroring.
    fn execute(&mut self, world: &mut World, inputs: &[FrameData]);
}

/// Per-tick timing, one entry per System in execution order.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    pub system_times: Vec<(&'static str, Duration)>,
    pub total_time: Duration,
}

/// The ordered System pipeline plus the tick counter it drives.
pub struct Pipeline {
    systems: Vec<Box<dyn System>>,
    tick_counter: u64,
    last_diagnostics: TickDiagnostics,
}

impl Pipeline {
    /// An empty pipeline. Use [`Self::push`] to register Systems in the
    /// exact order spec.md §4.3 lists them.
    pub fn new() -> Self {
        Pipeline { systems: Vec::new(), tick_counter: 0, last_diagnostics: TickDiagnostics::default() }
    }

    /// Register the next System in pipeline order.
    pub fn push(&mut self, system: Box<dyn System>) -> &mut Self {
        self.systems.push(system);
        self
    }

    /// Run every registered System once, in order, against `world` with
    /// this tick's `inputs`. Advances the tick counter unconditionally --
    /// the pipeline runs once per tick regardless of whether any System
    /// found work to do.
    pub fn run_tick(&mut self, world: &mut World, inputs: &[FrameData]) {
        let tick_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());

        for system in &mut self.systems {
            let span = tracing::debug_span!("system", name = system.name());
            let _guard = span.enter();
            let start = Instant::now();
            system.execute(world, inputs);
            system_times.push((system.name(), start.elapsed()));
        }

        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics { system_times, total_time: tick_start.elapsed() };
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
