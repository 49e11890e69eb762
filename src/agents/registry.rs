//! Agent Registry
//!
//! Roles that hand off to each other form a cycle. The registry owns every
//! role and handoffs are stored as ids, so the cycle never becomes an object
//! graph.

use super::role::{AgentId, AgentRole};
use crate::error::{Result, SupportError};
use std::collections::HashMap;

pub struct AgentRegistry<C: Send + Sync + 'static> {
    roles: HashMap<AgentId, AgentRole<C>>,
}

impl<C: Send + Sync + 'static> AgentRegistry<C> {
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }

    /// Register a role; returns its id
    pub fn register(&mut self, role: AgentRole<C>) -> AgentId {
        let id = role.id.clone();
        tracing::debug!("Registering agent role: {}", id);
        self.roles.insert(id.clone(), role);
        id
    }

    pub fn get(&self, id: &AgentId) -> Result<&AgentRole<C>> {
        self.roles
            .get(id)
            .ok_or_else(|| SupportError::UnknownAgent(id.clone()))
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.roles.contains_key(id)
    }

    /// Add a handoff edge between two registered roles
    pub fn link(&mut self, from: &AgentId, to: &AgentId) -> Result<()> {
        if !self.roles.contains_key(to) {
            return Err(SupportError::UnknownAgent(to.clone()));
        }
        let role = self
            .roles
            .get_mut(from)
            .ok_or_else(|| SupportError::UnknownAgent(from.clone()))?;

        if !role.handoffs.contains(to) {
            role.handoffs.push(to.clone());
        }
        Ok(())
    }

    /// Every handoff target must name a registered role
    pub fn validate(&self) -> Result<()> {
        for role in self.roles.values() {
            if let Some(missing) = role.handoffs.iter().find(|t| !self.roles.contains_key(*t)) {
                return Err(SupportError::UnknownAgent(missing.clone()));
            }
        }
        Ok(())
    }

    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.roles.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<C: Send + Sync + 'static> Default for AgentRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentBuilder;

    #[test]
    fn test_bidirectional_link() {
        let mut registry = AgentRegistry::<()>::new();
        let human = registry.register(AgentBuilder::new("HumanAgent").build());
        let bot = registry.register(AgentBuilder::new("BotAgent").handoff("HumanAgent").build());

        registry.link(&human, &bot).unwrap();
        registry.validate().unwrap();

        assert!(registry.get(&bot).unwrap().can_hand_off_to(&human));
        assert!(registry.get(&human).unwrap().can_hand_off_to(&bot));
    }

    #[test]
    fn test_link_rejects_unknown_roles() {
        let mut registry = AgentRegistry::<()>::new();
        let bot = registry.register(AgentBuilder::new("BotAgent").build());

        let err = registry.link(&bot, &AgentId::new("Ghost")).unwrap_err();
        assert!(matches!(err, SupportError::UnknownAgent(id) if id.as_str() == "Ghost"));
    }

    #[test]
    fn test_validate_catches_dangling_handoff() {
        let mut registry = AgentRegistry::<()>::new();
        registry.register(AgentBuilder::new("BotAgent").handoff("HumanAgent").build());

        assert!(registry.validate().is_err());
    }
}
