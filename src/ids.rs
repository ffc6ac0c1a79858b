//! Role-scoped identifier allocation.

/// Kind of identifier handed out by an [`IdAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Graph elements that are not entities (edges).
    Node,
    Agent,
    Resource,
}

const FIRST_ID: u64 = 1;

/// Issues monotonically increasing string identifiers, one counter per [`Role`].
///
/// Owned by the editing session, so clearing or replacing a scenario resets
/// exactly the counters that session depends on.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    node: u64,
    agent: u64,
    resource: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            node: FIRST_ID,
            agent: FIRST_ID,
            resource: FIRST_ID,
        }
    }

    /// Return the next identifier for `role` and advance its counter.
    pub fn next(&mut self, role: Role) -> String {
        let counter = match role {
            Role::Node => &mut self.node,
            Role::Agent => &mut self.agent,
            Role::Resource => &mut self.resource,
        };
        let id = *counter;
        *counter += 1;
        id.to_string()
    }

    /// Set every counter back to its starting value.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
