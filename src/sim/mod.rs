//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod combat;
pub mod events;
pub mod experience;
pub mod hazard;
pub mod hostile;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use collision::{Hitbox, Rect};
pub use events::{GameEvent, SoundCue};
pub use experience::{ExperienceOrb, Progress};
pub use hazard::{Bullet, BulletOwner, Cutter, Meteor, Satellite, Swing};
pub use hostile::{DamageOutcome, Hostile, HostileKind};
pub use spawner::{SpawnMode, Spawner};
pub use state::{GamePhase, GameState, Player, RunConfig};
pub use tick::{TickInput, tick};
pub use upgrade::{LevelUpMenu, Loadout, Upgrade};
