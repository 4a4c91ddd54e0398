//! # NIMA Limbic Regulation
//!
//! Fast, non-verbal regulation between the seven primary affects. Affects do
//! not move independently: fear shuts down play, care calms rage, play soothes
//! panic. This crate realises those couplings as a pure function over an
//! [`AffectVector`](nima_core::AffectVector), applied once per tick before
//! the state is recorded.

pub mod interactions;

pub use interactions::{
    apply_interactions, explain, get_effects, Interaction, InteractionMatrix,
    EFFECT_NOISE_FLOOR, INTERACTION_THRESHOLD,
};
