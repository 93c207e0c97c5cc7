//! In-process engine facade and the HTTP presentation plane.
//!
//! One `tokio::sync::Mutex` is the kernel's single critical section: ticking,
//! control commands, snapshot projection, and the run-loop cancellation
//! handle all serialize through it.

mod server;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use industria_core::{CatalogError, SimWorld};
use industria_proto::{RecipeView, SimConfig, Snapshot};
use tokio::sync::Mutex;
use tracing::warn;

pub use server::{serve, ServerError};

#[derive(Debug)]
struct EngineInner {
    world: SimWorld,
    cancel: Option<Arc<AtomicBool>>,
}

/// Shared handle on one simulation. Cloning shares the same world.
#[derive(Debug, Clone)]
pub struct Engine {
    inner: Arc<Mutex<EngineInner>>,
}

impl Engine {
    pub fn from_config(config: SimConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(EngineInner {
                world: SimWorld::new(config)?,
                cancel: None,
            })),
        })
    }

    pub async fn snapshot(&self) -> Snapshot {
        let mut inner = self.inner.lock().await;
        let running = inner.cancel.is_some();
        inner.world.snapshot(running)
    }

    /// Advances the simulation exactly one tick and projects the result.
    pub async fn tick(&self) -> Snapshot {
        let mut inner = self.inner.lock().await;
        inner.world.tick();
        let running = inner.cancel.is_some();
        inner.world.snapshot(running)
    }

    /// Launches the background tick loop. Running twice is a warning, not an
    /// error: the existing loop keeps its handle.
    pub async fn run(&self) {
        let flag = {
            let mut inner = self.inner.lock().await;
            if inner.cancel.is_some() {
                warn!("simulation is already running");
                return;
            }
            let flag = Arc::new(AtomicBool::new(false));
            inner.cancel = Some(flag.clone());
            flag
        };

        let shared = self.inner.clone();
        tokio::spawn(async move {
            loop {
                // Checked before ticking: a fired handle never commits
                // another tick.
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                let (tick, warmup, sleep_ms) = {
                    let mut inner = shared.lock().await;
                    inner.world.tick();
                    let config = inner.world.config();
                    (
                        inner.world.current_tick(),
                        config.warmup_ticks,
                        config.run_sleep_ms,
                    )
                };
                if tick >= warmup {
                    // Slow down a long-running simulation to save CPU.
                    tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
                } else {
                    tokio::task::yield_now().await;
                }
            }

            // Only clear the handle this loop owns; a stop-then-run race may
            // already have installed a successor.
            let mut inner = shared.lock().await;
            if inner
                .cancel
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &flag))
            {
                inner.cancel = None;
            }
        });
    }

    /// Fires the cancellation handle. Stopping twice is a warning.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        match inner.cancel.take() {
            Some(flag) => flag.store(true, Ordering::Relaxed),
            None => warn!("simulation is already stopped"),
        }
    }

    /// Re-runs initialization with the original seed.
    pub async fn reset(&self) -> Result<Snapshot, CatalogError> {
        let mut inner = self.inner.lock().await;
        inner.world.reset()?;
        let running = inner.cancel.is_some();
        Ok(inner.world.snapshot(running))
    }

    pub async fn recipes(&self) -> Vec<RecipeView> {
        self.inner.lock().await.world.recipes()
    }

    /// Toggles a recipe; `None` when no recipe carries that name.
    pub async fn set_recipe(&self, name: &str, active: bool) -> Option<Vec<RecipeView>> {
        let mut inner = self.inner.lock().await;
        if inner.world.set_recipe(name, active) {
            Some(inner.world.recipes())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_engine() -> Engine {
        let mut config = SimConfig::default();
        config.seed = 52;
        Engine::from_config(config).expect("embedded catalogs load")
    }

    #[tokio::test]
    async fn tick_advances_the_counter() {
        let engine = make_engine();
        assert_eq!(engine.snapshot().await.tick, 0);
        assert_eq!(engine.tick().await.tick, 1);
        assert_eq!(engine.tick().await.tick, 2);
    }

    #[tokio::test]
    async fn run_and_stop_flip_the_running_flag() {
        let engine = make_engine();
        assert!(!engine.snapshot().await.running);

        engine.run().await;
        assert!(engine.snapshot().await.running);

        // A second run is a warning with no state change.
        engine.run().await;
        assert!(engine.snapshot().await.running);

        engine.stop().await;
        assert!(!engine.snapshot().await.running);

        // As is a second stop.
        engine.stop().await;
        assert!(!engine.snapshot().await.running);
    }

    #[tokio::test]
    async fn stop_then_run_produces_a_fresh_loop() {
        let engine = make_engine();
        engine.run().await;
        engine.stop().await;
        engine.run().await;
        assert!(engine.snapshot().await.running);
        engine.stop().await;
        assert!(!engine.snapshot().await.running);
    }

    #[tokio::test]
    async fn reset_matches_a_fresh_engine() {
        let engine = make_engine();
        for _ in 0..25 {
            engine.tick().await;
        }
        let reset_snapshot = engine.reset().await.expect("reset succeeds");
        assert_eq!(reset_snapshot.tick, 0);

        let mut replayed = None;
        for _ in 0..25 {
            replayed = Some(engine.tick().await);
        }

        let fresh = make_engine();
        let mut fresh_snapshot = fresh.snapshot().await;
        for _ in 0..25 {
            fresh_snapshot = fresh.tick().await;
        }
        assert_eq!(replayed.expect("ticked"), fresh_snapshot);
    }

    #[tokio::test]
    async fn unknown_recipe_toggle_is_rejected() {
        let engine = make_engine();
        assert!(engine.set_recipe("No Such Recipe", false).await.is_none());

        let recipes = engine.recipes().await;
        let name = recipes.first().expect("catalog has recipes").name.clone();
        let updated = engine
            .set_recipe(&name, false)
            .await
            .expect("known recipe toggles");
        let view = updated
            .iter()
            .find(|r| r.name == name)
            .expect("recipe still listed");
        assert!(!view.active);
    }
}
