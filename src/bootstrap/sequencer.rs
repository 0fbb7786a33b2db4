//! The bootstrap state machine.

use crate::resolve::handle::ResourceHandle;
use crate::unity::BuildSet;
use crate::util::Error;

use super::{Phase, RuntimeConfig, RuntimeFactory, RuntimeInstance, ScriptLoader, SequencerObserver};

/// Drives the framework -> loader -> runtime-creation sequence over the four
/// materialized build assets.
///
/// The sequencer owns the assets; teardown (explicit or on drop, from any
/// phase) removes every script it injected and revokes all four handles
/// exactly once, so a view unmounting mid-sequence leaks nothing.
pub struct Sequencer {
    assets: BuildSet<ResourceHandle>,
    config: RuntimeConfig,
    loader: Box<dyn ScriptLoader>,
    factory: Box<dyn RuntimeFactory>,
    observer: Box<dyn SequencerObserver>,
    phase: Phase,
    injected: Vec<String>,
    runtime: Option<Box<dyn RuntimeInstance>>,
    released: bool,
}

impl Sequencer {
    pub fn new(
        assets: BuildSet<ResourceHandle>,
        config: RuntimeConfig,
        loader: Box<dyn ScriptLoader>,
        factory: Box<dyn RuntimeFactory>,
        observer: Box<dyn SequencerObserver>,
    ) -> Self {
        Self {
            assets,
            config,
            loader,
            factory,
            observer,
            phase: Phase::Idle,
            injected: Vec::new(),
            runtime: None,
            released: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The configuration handed to the runtime-creation entry point.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Begin the sequence: inject the framework script.
    ///
    /// Only meaningful from `Idle`; later calls are ignored.
    pub fn start(&mut self) {
        if self.released || self.phase != Phase::Idle {
            return;
        }
        self.set_phase(Phase::FrameworkLoading);
        self.inject(self.assets.framework.url().to_string());
    }

    /// The most recently injected script reported a successful load.
    pub fn script_loaded(&mut self) {
        if self.released {
            return;
        }
        match self.phase {
            Phase::FrameworkLoading => {
                self.set_phase(Phase::LoaderLoading);
                self.inject(self.assets.loader.url().to_string());
            }
            Phase::LoaderLoading => {
                self.set_phase(Phase::RuntimeInitializing);
                let config = self.config.clone();
                if let Err(e) = self.factory.create(&config) {
                    self.fail(&e.to_string());
                }
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "ignoring script load outside sequence");
            }
        }
    }

    /// The most recently injected script failed to load.
    pub fn script_failed(&mut self, message: &str) {
        if self.released {
            return;
        }
        self.fail(message);
    }

    /// Runtime loading progress, a fraction in `[0, 1]`.
    pub fn report_progress(&mut self, fraction: f32) {
        if self.released || self.phase != Phase::RuntimeInitializing {
            return;
        }
        self.observer.progress(fraction.clamp(0.0, 1.0));
    }

    /// The runtime-creation call resolved with an instance.
    pub fn runtime_ready(&mut self, instance: Box<dyn RuntimeInstance>) {
        if self.released || self.phase != Phase::RuntimeInitializing {
            // Stale or out-of-order; the instance is dropped unused.
            tracing::debug!(phase = ?self.phase, "ignoring runtime instance outside sequence");
            return;
        }
        self.runtime = Some(instance);
        self.set_phase(Phase::Running);
    }

    /// The runtime-creation call rejected.
    pub fn runtime_failed(&mut self, message: &str) {
        if self.released {
            return;
        }
        let err = Error::RuntimeInit(message.to_string());
        self.fail(&err.to_string());
    }

    /// Forward the fullscreen toggle to the running runtime.
    pub fn set_fullscreen(&mut self, on: bool) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.set_fullscreen(on);
        }
    }

    /// Tear the sequence down from any phase.
    ///
    /// Removes injected scripts in reverse injection order and revokes all
    /// four asset handles. Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        tracing::debug!(phase = ?self.phase, "tearing down bootstrap sequence");

        self.runtime = None;
        for url in self.injected.drain(..).rev().collect::<Vec<_>>() {
            self.loader.remove(&url);
        }
        self.assets.loader.revoke();
        self.assets.data.revoke();
        self.assets.framework.revoke();
        self.assets.code.revoke();
    }

    fn inject(&mut self, url: String) {
        match self.loader.inject(&url) {
            Ok(()) => self.injected.push(url),
            Err(e) => self.fail(&e.to_string()),
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "bootstrap phase change");
        self.phase = phase;
        self.observer.phase_changed(phase);
    }

    fn fail(&mut self, message: &str) {
        if self.phase.is_terminal() {
            return;
        }
        tracing::warn!(%message, "bootstrap failed");
        self.observer.failed(message);
        self.set_phase(Phase::Failed);
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.teardown();
    }
}
