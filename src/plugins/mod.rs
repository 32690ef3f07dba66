//! Subsystem plugins. Each plugin owns its storage (database schema, event
//! log) and its CLI surface.

pub mod baseline;
