//! # Background Build
//!
//! Runs a [`WorldBuilder`] on its own thread so the host stays responsive.
//! Progress arrives over a channel; the finished world comes back through
//! [`BackgroundBuild::join`].

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::WorldConfig;
use crate::error::{TerrainError, TerrainResult};
use crate::world::{BuildStage, BuildStats, BuildStep, WorldBuilder, WorldHandle};

/// Progress report from a background build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A stage began.
    Stage(BuildStage),
    /// The builder reached a yield point.
    Yielded {
        /// Stage that yielded.
        stage: BuildStage,
        /// Terrain chunks written so far.
        chunks_written: u32,
        /// Terrain chunks in total.
        total_chunks: u32,
    },
    /// The world is complete.
    Finished(BuildStats),
    /// The build failed; the error itself is returned by `join`.
    Failed(String),
}

/// A build running on a worker thread.
pub struct BackgroundBuild {
    events: Receiver<BuildEvent>,
    handle: JoinHandle<TerrainResult<WorldHandle>>,
}

impl BackgroundBuild {
    /// Progress events, in order. The channel disconnects when the worker
    /// exits.
    #[must_use]
    pub fn events(&self) -> &Receiver<BuildEvent> {
        &self.events
    }

    /// Returns true once the worker has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns the world.
    ///
    /// # Errors
    ///
    /// Returns the build's own error, or `TerrainError::BuildThreadPanicked`.
    pub fn join(self) -> TerrainResult<WorldHandle> {
        self.handle
            .join()
            .map_err(|_| TerrainError::BuildThreadPanicked)?
    }
}

/// Starts building `config` on a new thread.
#[must_use]
pub fn spawn_build(config: WorldConfig) -> BackgroundBuild {
    let (sender, events) = unbounded();
    let handle = thread::spawn(move || {
        let result = run(config, &sender);
        if let Err(err) = &result {
            let _ = sender.send(BuildEvent::Failed(err.to_string()));
        }
        result
    });
    BackgroundBuild { events, handle }
}

fn run(config: WorldConfig, sender: &Sender<BuildEvent>) -> TerrainResult<WorldHandle> {
    let mut builder = WorldBuilder::new(config)?;
    // The receiver may be dropped; the build still runs to completion.
    let _ = sender.send(BuildEvent::Stage(builder.stage()));
    loop {
        let before = builder.stage();
        let step = builder.step()?;
        if builder.stage() != before && builder.stage() != BuildStage::Done {
            let _ = sender.send(BuildEvent::Stage(builder.stage()));
        }
        match step {
            BuildStep::Finished => break,
            BuildStep::Yield(stage) => {
                let (chunks_written, total_chunks) = builder.chunk_progress();
                let _ = sender.send(BuildEvent::Yielded {
                    stage,
                    chunks_written,
                    total_chunks,
                });
            }
            BuildStep::Progress(_) => {}
        }
    }
    let world = builder.finish()?;
    let _ = sender.send(BuildEvent::Finished(world.stats().clone()));
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn test_background_build_reports_stages() {
        let mut config = WorldConfig::default();
        config.map = MapConfig { width: 192.0, depth: 192.0, ..MapConfig::default() };
        let (world, events) = build_and_collect(spawn_build(config));
        let world = world.unwrap();

        let stages: Vec<BuildStage> = events
            .iter()
            .filter_map(|e| match e {
                BuildEvent::Stage(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(stages.first(), Some(&BuildStage::Terrain));
        assert_eq!(stages.last(), Some(&BuildStage::Boundary));
        assert!(events.iter().any(|e| matches!(e, BuildEvent::Yielded { .. })));
        assert_eq!(events.last(), Some(&BuildEvent::Finished(world.stats().clone())));
    }

    #[test]
    fn test_background_build_reports_config_errors() {
        let mut config = WorldConfig::default();
        config.zones.open.density.rocks = -1.0;
        let (world, events) = build_and_collect(spawn_build(config));
        assert!(matches!(world, Err(TerrainError::Config(_))));
        assert!(matches!(events.last(), Some(BuildEvent::Failed(_))));
    }

    fn build_and_collect(build: BackgroundBuild) -> (TerrainResult<WorldHandle>, Vec<BuildEvent>) {
        let events: Vec<BuildEvent> = build.events().iter().collect();
        (build.join(), events)
    }
}
