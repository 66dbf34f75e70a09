//! Per-kind level tables
//!
//! Each navigation kind owns an ordered table `level -> handler`. Tables are
//! registered once at startup and checked for density there, so a dispatch
//! miss at runtime always means a token and the tables disagree.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::codec::{NavKind, NavigationAction, MAX_LEVEL};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("no flow registered for {kind}")]
    MissingFlow { kind: NavKind },

    #[error("{kind} flow registered twice")]
    DuplicateFlow { kind: NavKind },

    #[error("{kind} flow has no handler for level {level}")]
    Gap { kind: NavKind, level: u8 },

    #[error("{kind} flow registers level {level} more than once")]
    DuplicateLevel { kind: NavKind, level: u8 },

    #[error("{kind} flow registers level {level}, above the encodable maximum")]
    LevelOutOfRange { kind: NavKind, level: u8 },

    #[error("{kind} flow has no handler for level {level}")]
    UnknownLevel { kind: NavKind, level: u8 },
}

/// Dense handler table of one kind
#[derive(Debug, Clone)]
pub struct FlowTable<H> {
    kind: NavKind,
    handlers: Vec<H>,
}

impl<H> FlowTable<H> {
    /// Build a table from explicit `(level, handler)` pairs, in any order
    pub fn new(kind: NavKind, entries: Vec<(u8, H)>) -> Result<Self, RoutingError> {
        let mut slots: Vec<Option<H>> = Vec::new();
        for (level, handler) in entries {
            if level > MAX_LEVEL {
                return Err(RoutingError::LevelOutOfRange { kind, level });
            }
            let index = usize::from(level);
            if slots.len() <= index {
                slots.resize_with(index + 1, || None);
            }
            if slots[index].is_some() {
                return Err(RoutingError::DuplicateLevel { kind, level });
            }
            slots[index] = Some(handler);
        }

        let mut handlers = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(handler) => handlers.push(handler),
                None => {
                    return Err(RoutingError::Gap {
                        kind,
                        level: index as u8,
                    })
                }
            }
        }
        if handlers.is_empty() {
            return Err(RoutingError::Gap { kind, level: 0 });
        }

        Ok(Self { kind, handlers })
    }

    pub fn kind(&self) -> NavKind {
        self.kind
    }

    /// Number of levels, i.e. the first level without a handler
    pub fn depth(&self) -> usize {
        self.handlers.len()
    }

    pub fn get(&self, level: u8) -> Option<&H> {
        self.handlers.get(usize::from(level))
    }
}

/// Router over every navigation kind
#[derive(Debug, Clone)]
pub struct NavigationRouter<H> {
    flows: HashMap<NavKind, FlowTable<H>>,
}

impl<H> NavigationRouter<H> {
    pub fn builder() -> NavigationRouterBuilder<H> {
        NavigationRouterBuilder { flows: Vec::new() }
    }

    /// Handler for the action's kind and level
    pub fn route(&self, action: &NavigationAction) -> Result<&H, RoutingError> {
        let table = self
            .flows
            .get(&action.kind)
            .ok_or(RoutingError::MissingFlow { kind: action.kind })?;
        table.get(action.level).ok_or(RoutingError::UnknownLevel {
            kind: action.kind,
            level: action.level,
        })
    }

    pub fn depth(&self, kind: NavKind) -> usize {
        self.flows.get(&kind).map_or(0, FlowTable::depth)
    }
}

pub struct NavigationRouterBuilder<H> {
    flows: Vec<Result<FlowTable<H>, RoutingError>>,
}

impl<H> NavigationRouterBuilder<H> {
    pub fn flow(mut self, kind: NavKind, entries: Vec<(u8, H)>) -> Self {
        self.flows.push(FlowTable::new(kind, entries));
        self
    }

    /// Check every table and that every kind has one
    pub fn build(self) -> Result<NavigationRouter<H>, RoutingError> {
        let mut flows = HashMap::new();
        for table in self.flows {
            let table = table?;
            let kind = table.kind();
            if flows.insert(kind, table).is_some() {
                return Err(RoutingError::DuplicateFlow { kind });
            }
        }

        for kind in NavKind::ALL {
            match flows.get(&kind) {
                Some(table) => debug!(kind = %kind, levels = table.depth(), "Navigation flow registered"),
                None => return Err(RoutingError::MissingFlow { kind }),
            }
        }

        Ok(NavigationRouter { flows })
    }
}
