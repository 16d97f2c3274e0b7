/*
 * BFX-FIX GATEWAY - FIX MESSAGE LAYER
 * =================================================================
 * Component Name: src/fix/mod.rs
 * Core Responsibility: the only place in the crate that touches
 * `quickfix::Message` directly. Everything above this layer speaks in
 * the protocol-agnostic intents from `models::execution`.
 * =================================================================
 */

pub mod message;
pub mod tags;

pub use message::*;
