// SYNOID Kernel State
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::gpt_oss_bridge::CompletionProvider;
use crate::agent::highlights::{HighlightSelector, HighlightStrategy};
use crate::agent::transcription::TranscriptBundle;
use crate::error::HighlightError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct KernelState {
    /// session id -> transcript
    pub sessions: RwLock<HashMap<String, TranscriptBundle>>,
    pub strategy: HighlightStrategy,
    /// `None` when no credential was configured at startup.
    pub provider: Option<Arc<dyn CompletionProvider>>,
}

impl KernelState {
    pub fn new(strategy: HighlightStrategy, provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            strategy,
            provider,
        }
    }

    pub async fn transcript(&self, session_id: &str) -> Option<TranscriptBundle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn selector(&self) -> Result<HighlightSelector, HighlightError> {
        let provider = self
            .provider
            .clone()
            .ok_or(HighlightError::MissingCredential("SYNOID_API_KEY or OPENAI_API_KEY"))?;
        Ok(HighlightSelector::new(provider, self.strategy.clone()))
    }
}

#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub status: &'static str,
    pub sessions: usize,
}
