//! In-memory provider.
//!
//! Serves flag values from memory with optional per-user overrides and failure
//! injection. Used for offline runs and as the provider double in tests.

use super::{FlagProviderClient, FlagValues};
use crate::context::EvaluationContext;
use crate::error::ApiError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;

pub struct InMemoryProvider {
    flags: RwLock<FlagValues>,
    user_overrides: RwLock<HashMap<String, FlagValues>>,
    failing_flags: RwLock<HashSet<String>>,
    fail_initialization: AtomicBool,
    stall_initialization: AtomicBool,
    fail_identify: AtomicBool,
    initialized: AtomicBool,
    closed: AtomicBool,
    context: RwLock<EvaluationContext>,
    seen_contexts: RwLock<Vec<EvaluationContext>>,
    variation_calls: AtomicUsize,
    identify_calls: AtomicUsize,
    state: watch::Sender<FlagValues>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        let (state, _) = watch::channel(FlagValues::new());
        Self {
            flags: RwLock::new(FlagValues::new()),
            user_overrides: RwLock::new(HashMap::new()),
            failing_flags: RwLock::new(HashSet::new()),
            fail_initialization: AtomicBool::new(false),
            stall_initialization: AtomicBool::new(false),
            fail_identify: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            context: RwLock::new(EvaluationContext::anonymous()),
            seen_contexts: RwLock::new(Vec::new()),
            variation_calls: AtomicUsize::new(0),
            identify_calls: AtomicUsize::new(0),
            state,
        }
    }

    pub fn with_flag(self, key: &str, value: bool) -> Self {
        self.flags.write().insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Serve `value` for `key` only when the context's user key matches.
    pub fn with_user_override(self, user_key: &str, key: &str, value: bool) -> Self {
        self.user_overrides
            .write()
            .entry(user_key.to_string())
            .or_default()
            .insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Make every evaluation of `key` fail.
    pub fn with_failing_flag(self, key: &str) -> Self {
        self.failing_flags.write().insert(key.to_string());
        self
    }

    pub fn with_failing_initialization(self) -> Self {
        self.fail_initialization.store(true, Ordering::SeqCst);
        self
    }

    /// Make `wait_for_initialization` never complete.
    pub fn with_stalled_initialization(self) -> Self {
        self.stall_initialization.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_identify(self) -> Self {
        self.fail_identify.store(true, Ordering::SeqCst);
        self
    }

    /// Change a flag at runtime and push the new state to subscribers.
    pub fn set_flag(&self, key: &str, value: bool) {
        self.flags.write().insert(key.to_string(), Value::Bool(value));
        let context = self.context.read().clone();
        self.state.send_replace(self.values_for(&context));
    }

    pub fn variation_calls(&self) -> usize {
        self.variation_calls.load(Ordering::SeqCst)
    }

    pub fn identify_calls(&self) -> usize {
        self.identify_calls.load(Ordering::SeqCst)
    }

    /// Every context passed to `variation`, in call order.
    pub fn seen_contexts(&self) -> Vec<EvaluationContext> {
        self.seen_contexts.read().clone()
    }

    /// Context from the last successful `identify`.
    pub fn current_context(&self) -> EvaluationContext {
        self.context.read().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn values_for(&self, context: &EvaluationContext) -> FlagValues {
        let mut values = self.flags.read().clone();
        if let Some(overrides) = self.user_overrides.read().get(context.user_key()) {
            for (key, value) in overrides {
                values.insert(key.clone(), value.clone());
            }
        }
        values
    }

    fn ensure_open(&self) -> Result<(), ApiError> {
        if self.is_closed() {
            return Err(ApiError::ProviderUnavailable(
                "in-memory provider has been closed".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlagProviderClient for InMemoryProvider {
    async fn wait_for_initialization(&self) -> Result<(), ApiError> {
        self.ensure_open()?;
        if self.stall_initialization.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_initialization.load(Ordering::SeqCst) {
            return Err(ApiError::ProviderRequestFailed(
                "initialization refused".to_string(),
            ));
        }
        self.initialized.store(true, Ordering::SeqCst);
        let context = self.context.read().clone();
        self.state.send_replace(self.values_for(&context));
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst) && !self.is_closed()
    }

    async fn variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: bool,
    ) -> Result<bool, ApiError> {
        self.variation_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_contexts.write().push(context.clone());
        self.ensure_open()?;
        if self.failing_flags.read().contains(flag_key) {
            return Err(ApiError::ProviderEvaluation {
                flag: flag_key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(self
            .values_for(context)
            .get(flag_key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default))
    }

    async fn all_flags(&self, context: &EvaluationContext) -> Result<FlagValues, ApiError> {
        self.ensure_open()?;
        Ok(self.values_for(context))
    }

    async fn identify(&self, context: EvaluationContext) -> Result<(), ApiError> {
        self.identify_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_open()?;
        if self.fail_identify.load(Ordering::SeqCst) {
            return Err(ApiError::ProviderRequestFailed("identify refused".to_string()));
        }
        let values = self.values_for(&context);
        *self.context.write() = context;
        self.state.send_replace(values);
        Ok(())
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> Option<watch::Receiver<FlagValues>> {
        Some(self.state.subscribe())
    }

    fn provider_name(&self) -> &str {
        "in-memory"
    }
}
