//! Outbound adapters driven by the domain.

pub mod persistence;
