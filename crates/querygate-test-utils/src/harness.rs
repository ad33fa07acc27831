// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete exchange pipeline with a mock agent
//! over a seeded temporary database. `ask()` drives one exchange.

use std::sync::Arc;

use querygate_agent::{Gatekeeper, SessionRegistry};
use querygate_config::{AgentProvider, QuerygateConfig};
use querygate_core::{AgentProposal, ConversationEntry, QuerygateError, SessionId};
use querygate_storage::load_schema;

use crate::fixtures::{self, Fixture};
use crate::mock_agent::MockAgent;

/// Builder for creating test environments with configurable limits.
pub struct TestHarnessBuilder {
    config: QuerygateConfig,
    proposals: Vec<AgentProposal>,
    products_only: Option<usize>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = QuerygateConfig::default();
        config.agent.provider = AgentProvider::Passthrough;
        config.database.enable_query_logging = false;
        Self {
            config,
            proposals: Vec::new(),
            products_only: None,
        }
    }

    pub fn max_result_rows(mut self, rows: usize) -> Self {
        self.config.database.max_result_rows = rows;
        self
    }

    pub fn allow_destructive(mut self, allow: bool) -> Self {
        self.config.database.allow_destructive_queries = allow;
        self
    }

    pub fn query_timeout_secs(mut self, secs: u64) -> Self {
        self.config.database.query_timeout_secs = secs;
        self
    }

    pub fn max_history(mut self, entries: usize) -> Self {
        self.config.session.max_conversation_history = entries;
        self
    }

    pub fn session_timeout_minutes(mut self, minutes: u64) -> Self {
        self.config.session.timeout_minutes = minutes;
        self
    }

    pub fn recent_context(mut self, entries: usize) -> Self {
        self.config.agent.recent_context = entries;
        self
    }

    /// Set mock agent proposals, consumed in order.
    pub fn with_proposals(mut self, proposals: Vec<AgentProposal>) -> Self {
        self.proposals = proposals;
        self
    }

    /// Use a bare `products` table with `rows` rows instead of the sample database.
    pub fn products_only(mut self, rows: usize) -> Self {
        self.products_only = Some(rows);
        self
    }

    /// Build the test harness, creating the database and all subsystems.
    pub async fn build(mut self) -> Result<TestHarness, QuerygateError> {
        let fixture = match self.products_only {
            Some(rows) => fixtures::products_table(rows)?,
            None => fixtures::sample_database().await?,
        };
        self.config.database.path = fixture.path_str();
        querygate_config::validate_config(&self.config).map_err(|errors| {
            QuerygateError::Config(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        let schema = Arc::new(load_schema(&querygate_storage::Database::from_config(&self.config)).await?);
        let agent = Arc::new(MockAgent::with_proposals(self.proposals));
        let gatekeeper = Gatekeeper::from_config(&self.config, agent.clone(), schema);

        Ok(TestHarness {
            agent,
            gatekeeper: Arc::new(gatekeeper),
            config: Arc::new(self.config),
            _fixture: fixture,
        })
    }
}

/// A complete test environment with a mock agent and temp storage.
pub struct TestHarness {
    /// The mock agent, for queuing proposals and inspecting requests.
    pub agent: Arc<MockAgent>,
    pub gatekeeper: Arc<Gatekeeper>,
    pub config: Arc<QuerygateConfig>,
    _fixture: Fixture,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness over the sample database with default limits.
    pub async fn new() -> Result<Self, QuerygateError> {
        Self::builder().build().await
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.gatekeeper.registry()
    }

    /// Drive one exchange through the full pipeline.
    pub async fn ask(
        &self,
        session_id: &str,
        question: &str,
    ) -> Result<ConversationEntry, QuerygateError> {
        self.gatekeeper
            .handle(&SessionId::from(session_id), question)
            .await
    }
}
