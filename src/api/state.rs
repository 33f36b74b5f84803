//! Application state for the Payroll Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::PayrollConfig;
use crate::error::EngineResult;
use crate::ledger::PayrollLedger;
use crate::models::Actor;
use crate::store::Database;

use super::request::ACTOR_HEADER;

/// Shared application state.
///
/// Contains the payroll ledger (and through it the store) plus the actor
/// recorded for requests that do not identify themselves.
#[derive(Clone)]
pub struct AppState {
    ledger: PayrollLedger,
    default_actor: Actor,
}

impl AppState {
    /// Creates application state from a ledger.
    pub fn new(ledger: PayrollLedger, default_actor: Actor) -> Self {
        Self {
            ledger,
            default_actor,
        }
    }

    /// Opens the configured store and builds the ledger.
    ///
    /// Without `storage.database_path` the store is an in-memory database.
    pub async fn from_config(config: &PayrollConfig) -> EngineResult<Self> {
        let db = match &config.storage.database_path {
            Some(path) => Database::open(path).await?,
            None => Database::in_memory().await?,
        };
        let ledger = PayrollLedger::new(Arc::new(db), config.salary_computer());
        Ok(Self::new(ledger, Actor::new(&config.server.default_actor)))
    }

    /// Returns the payroll ledger.
    pub fn ledger(&self) -> &PayrollLedger {
        &self.ledger
    }

    /// Returns the store.
    pub fn database(&self) -> &Database {
        self.ledger.database()
    }

    /// Resolves the acting principal from the `X-Actor` header.
    pub fn actor(&self, headers: &HeaderMap) -> Actor {
        headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Actor::new)
            .unwrap_or_else(|| self.default_actor.clone())
    }
}
