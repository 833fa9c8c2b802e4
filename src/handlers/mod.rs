// handlers/mod.rs - HTTP handlers by access tier
//
// Public (no session) → Admin (session + role gate per resource)
pub mod admin;
pub mod public;
