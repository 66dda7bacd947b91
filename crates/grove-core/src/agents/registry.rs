//! Agent registry for managing and looking up agent backends.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::backends::{ClaudeBackend, CodexBackend, GeminiBackend, OpenCodeBackend};
use super::traits::AgentBackend;
use super::types::AgentType;

/// Global registry of all supported agent backends.
static REGISTRY: LazyLock<AgentRegistry> = LazyLock::new(AgentRegistry::new);

/// Registry that manages all agent backend implementations.
///
/// Uses `AgentType` as the internal key for type safety, while providing
/// string-based lookup functions for callers holding ledger tool ids.
struct AgentRegistry {
    backends: HashMap<AgentType, Box<dyn AgentBackend>>,
}

impl AgentRegistry {
    fn new() -> Self {
        let mut backends: HashMap<AgentType, Box<dyn AgentBackend>> = HashMap::new();
        backends.insert(AgentType::Claude, Box::new(ClaudeBackend));
        backends.insert(AgentType::Codex, Box::new(CodexBackend));
        backends.insert(AgentType::Gemini, Box::new(GeminiBackend));
        backends.insert(AgentType::OpenCode, Box::new(OpenCodeBackend));
        Self { backends }
    }

    fn get_by_type(&self, agent_type: AgentType) -> Option<&dyn AgentBackend> {
        self.backends.get(&agent_type).map(|b| b.as_ref())
    }

    fn get(&self, name: &str) -> Option<&dyn AgentBackend> {
        AgentType::parse(name).and_then(|t| self.get_by_type(t))
    }

    fn default_agent(&self) -> AgentType {
        AgentType::Claude
    }
}

/// Get a reference to an agent backend by name (case-insensitive).
pub fn get_agent(name: &str) -> Option<&'static dyn AgentBackend> {
    REGISTRY.get(name)
}

/// Get a reference to an agent backend by type.
pub fn get_agent_by_type(agent_type: AgentType) -> Option<&'static dyn AgentBackend> {
    REGISTRY.get_by_type(agent_type)
}

/// Check if an agent name is valid/supported (case-insensitive).
pub fn is_valid_agent(name: &str) -> bool {
    AgentType::parse(name).is_some()
}

/// Get all valid agent names (lowercase).
pub fn valid_agent_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = AgentType::all().iter().map(|t| t.as_str()).collect();
    names.sort();
    names
}

/// Get the default agent name.
pub fn default_agent_name() -> &'static str {
    REGISTRY.default_agent().as_str()
}

/// Get the default command for an agent by name (case-insensitive).
pub fn get_default_command(name: &str) -> Option<&'static str> {
    get_agent(name).map(|backend| backend.default_command())
}

/// Check if an agent's CLI is available in PATH (case-insensitive).
pub fn is_agent_available(name: &str) -> Option<bool> {
    get_agent(name).map(|backend| backend.is_available())
}
