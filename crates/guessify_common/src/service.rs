//! Shared guessing engine with atomic reload.
//!
//! The catalog and trained model are built on first use and then shared
//! read-only by every session. `reload()` builds a fresh pair and swaps it
//! in; a turn that already took a snapshot keeps using the old pair.

use crate::answer::AnswerRecord;
use crate::catalog::Catalog;
use crate::classifier::{Classifier, ModelConfig, TrainingReport};
use crate::config::GuessifyConfig;
use crate::error::{GuessError, Result};
use crate::turn::{TurnController, TurnOutcome};
use rand::Rng;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Where the catalog comes from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Inline(String),
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog> {
        match self {
            CatalogSource::File(path) => Catalog::load(path),
            CatalogSource::Inline(text) => Catalog::parse(text),
        }
    }
}

/// Immutable catalog + model pair
#[derive(Debug)]
pub struct Engine {
    pub catalog: Catalog,
    pub model: Classifier,
    pub controller: TurnController,
    pub report: TrainingReport,
}

impl Engine {
    pub fn build(
        source: &CatalogSource,
        model_config: &ModelConfig,
        controller: TurnController,
    ) -> Result<Self> {
        let catalog = source.load()?;
        let model = Classifier::train(&catalog, model_config.clone())?;
        let report = model.evaluate(&catalog)?;
        Ok(Self {
            catalog,
            model,
            controller,
            report,
        })
    }

    pub fn advance<R: Rng + ?Sized>(
        &self,
        answers: &[AnswerRecord],
        rng: &mut R,
    ) -> Result<TurnOutcome> {
        self.controller
            .advance(&self.catalog, &self.model, answers, rng)
    }
}

/// Lazily built, reloadable engine shared across sessions
#[derive(Debug)]
pub struct GuessService {
    source: CatalogSource,
    model_config: ModelConfig,
    controller: TurnController,
    engine: RwLock<Option<Arc<Engine>>>,
}

impl GuessService {
    pub fn new(source: CatalogSource, model_config: ModelConfig, controller: TurnController) -> Self {
        Self {
            source,
            model_config,
            controller,
            engine: RwLock::new(None),
        }
    }

    pub fn from_config(config: &GuessifyConfig) -> Self {
        Self::new(
            CatalogSource::File(config.catalog.path.clone()),
            config.model.clone(),
            config.turn_controller(),
        )
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.read().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Current engine, building it on first use
    pub fn engine(&self) -> Result<Arc<Engine>> {
        {
            let guard = self
                .engine
                .read()
                .map_err(|_| GuessError::Internal("engine lock poisoned".to_string()))?;
            if let Some(engine) = guard.as_ref() {
                return Ok(Arc::clone(engine));
            }
        }

        let mut guard = self
            .engine
            .write()
            .map_err(|_| GuessError::Internal("engine lock poisoned".to_string()))?;
        // another caller may have built it while we waited
        if let Some(engine) = guard.as_ref() {
            return Ok(Arc::clone(engine));
        }
        let engine = Arc::new(Engine::build(&self.source, &self.model_config, self.controller.clone())?);
        info!("Guessing engine ready ({} entities)", engine.catalog.len());
        *guard = Some(Arc::clone(&engine));
        Ok(engine)
    }

    /// Rebuild from the source and swap atomically.
    ///
    /// On failure the previous engine stays in place.
    pub fn reload(&self) -> Result<Arc<Engine>> {
        let fresh = Arc::new(Engine::build(&self.source, &self.model_config, self.controller.clone())?);
        let mut guard = self
            .engine
            .write()
            .map_err(|_| GuessError::Internal("engine lock poisoned".to_string()))?;
        *guard = Some(Arc::clone(&fresh));
        info!("Guessing engine reloaded ({} entities)", fresh.catalog.len());
        Ok(fresh)
    }

    /// One turn against a single engine snapshot
    pub fn advance_turn<R: Rng + ?Sized>(
        &self,
        answers: &[AnswerRecord],
        rng: &mut R,
    ) -> Result<TurnOutcome> {
        let engine = self.engine()?;
        engine.advance(answers, rng)
    }

    /// One turn using the thread-local random source
    pub fn next_turn(&self, answers: &[AnswerRecord]) -> Result<TurnOutcome> {
        self.advance_turn(answers, &mut rand::thread_rng())
    }
}
