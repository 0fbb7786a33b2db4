//! Game bootstrap: capabilities and the loading sequencer.
//!
//! Starting the external runtime means injecting its framework and loader
//! scripts in a fixed order, then invoking the runtime-creation entry point
//! with URLs for the data/framework/code assets. The sequencer depends only
//! on the capability traits here, so tests (and any rendering host) can
//! substitute their own script injection and runtime factory.

pub mod sequencer;

pub use sequencer::Sequencer;

use crate::resolve::handle::ResourceHandle;
use crate::settings::Settings;
use crate::unity::BuildSet;
use crate::util::Result;

/// Phases of the bootstrap sequence.
///
/// Strictly ordered: the loader script is never injected before the
/// framework script confirms its load, and runtime creation is never
/// attempted before the loader confirms. `Failed` is terminal and reachable
/// from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FrameworkLoading,
    LoaderLoading,
    RuntimeInitializing,
    Running,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Running | Phase::Failed)
    }
}

/// Configuration record handed to the runtime-creation entry point.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RuntimeConfig {
    pub data_url: String,
    pub framework_url: String,
    pub code_url: String,
    pub streaming_assets_url: String,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
}

impl RuntimeConfig {
    /// Build the config from materialized assets plus product metadata.
    pub fn new(assets: &BuildSet<ResourceHandle>, settings: &Settings, product_name: &str) -> Self {
        Self {
            data_url: assets.data.url().to_string(),
            framework_url: assets.framework.url().to_string(),
            code_url: assets.code.url().to_string(),
            streaming_assets_url: settings.streaming_assets_url.clone(),
            company_name: settings.company_name.clone(),
            product_name: product_name.to_string(),
            product_version: settings.product_version.clone(),
        }
    }
}

/// Capability to inject and remove script resources by URL.
///
/// `inject` starts an asynchronous load; the host reports completion by
/// calling [`Sequencer::script_loaded`] or [`Sequencer::script_failed`].
pub trait ScriptLoader {
    fn inject(&mut self, url: &str) -> Result<()>;
    fn remove(&mut self, url: &str);
}

/// Capability to start the external runtime.
///
/// `create` begins runtime creation; the host reports progress through
/// [`Sequencer::report_progress`] and the outcome through
/// [`Sequencer::runtime_ready`] or [`Sequencer::runtime_failed`].
pub trait RuntimeFactory {
    fn create(&mut self, config: &RuntimeConfig) -> Result<()>;
}

/// A started runtime instance.
pub trait RuntimeInstance {
    fn set_fullscreen(&mut self, on: bool);
}

/// Observer contract for the presenting view.
///
/// `RuntimeInitializing` is the cue to show a loading indicator and
/// `Running` the cue to hide it; `progress` carries the runtime's own
/// fractional loading progress in `[0, 1]`.
pub trait SequencerObserver {
    fn phase_changed(&mut self, _phase: Phase) {}
    fn progress(&mut self, _fraction: f32) {}
    fn failed(&mut self, _message: &str) {}
}

/// No-op observer for hosts that poll [`Sequencer::phase`] instead.
pub struct NullObserver;

impl SequencerObserver for NullObserver {}
