//! Inputs to a batch run.

use std::sync::Arc;

use recspec_types::{AnalysisMode, AudioDecoder, CancellationToken, InputSource, Preset, ProgressSink};
use recspec_validate::{Catalogue, ScriptMatchConfig};

/// One file to analyze: a display name (used for extension sniffing and
/// filename validation) paired with the host's byte handle.
#[derive(Clone)]
pub struct BatchInput {
    pub name: String,
    pub source: Arc<dyn InputSource>,
}

impl BatchInput {
    pub fn new(name: impl Into<String>, source: Arc<dyn InputSource>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Batch-wide configuration.
///
/// `script_match` and `catalogue` are the per-run filename-rule
/// configuration a preset's `filename_rule` may require (see
/// `recspec_validate::criteria::FilenameContext`); they travel alongside
/// the preset rather than inside it because a single preset is reused
/// across many distinct scripts or rosters.
#[derive(Clone)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub preset: Arc<Preset>,
    pub analysis_mode: AnalysisMode,
    pub progress_sink: Arc<dyn ProgressSink>,
    pub cancellation_token: CancellationToken,
    pub decoder: Option<Arc<dyn AudioDecoder>>,
    pub script_match: Option<Arc<ScriptMatchConfig>>,
    pub catalogue: Arc<Catalogue>,
}

impl BatchOptions {
    pub fn new(preset: Preset, progress_sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            concurrency: 1,
            preset: Arc::new(preset),
            analysis_mode: AnalysisMode::Experimental,
            progress_sink,
            cancellation_token: CancellationToken::new(),
            decoder: None,
            script_match: None,
            catalogue: Arc::new(Catalogue::embedded()),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_analysis_mode(mut self, mode: AnalysisMode) -> Self {
        self.analysis_mode = mode;
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_script_match(mut self, config: ScriptMatchConfig) -> Self {
        self.script_match = Some(Arc::new(config));
        self
    }

    pub fn with_catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = Arc::new(catalogue);
        self
    }
}
