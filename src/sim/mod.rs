//! Deterministic simulation module
//!
//! Everything the fixed-step loop advances lives here. This module must stay
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, passed in explicitly
//! - Stable iteration order (by element index)
//! - No rendering or platform dependencies beyond the upload boundary

pub mod clouds;
pub mod explosions;
pub mod fishes;
pub mod gadgets;
pub mod materials;
pub mod points;
pub mod ship;
pub mod solver;
pub mod springs;
pub mod triangles;
pub mod types;
pub mod vectorization;
pub mod world;

pub use clouds::{Cloud, Clouds, ShadowOffset};
pub use explosions::{Blast, Explosion, ExplosionType, Explosions, ShipPhysicsHandler};
pub use fishes::{Fish, FishSpecies, FishSpeciesDatabase, FishState, Fishes};
pub use gadgets::{Gadget, GadgetKind, GadgetState, Gadgets};
pub use materials::StructuralMaterial;
pub use points::{EphemeralKind, Points};
pub use ship::{PointDefinition, Ship, ShipDefinition};
pub use solver::SpringRelaxationSolver;
pub use springs::Springs;
pub use triangles::Triangles;
pub use types::{ElementIndex, GadgetId, GadgetType, PlaneId, ShipId, VisibleWorld};
pub use world::{OceanSurface, World};
