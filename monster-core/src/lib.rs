//! Dungeon Monster Core
//!
//! Server-authoritative lifecycle for dungeon monsters:
//! - Content templates (races, variants, skills) and a validated registry
//! - Grade rolling and stat composition
//! - Skill assignment, passive folding and active skill triggers
//! - Combat stats, damage resolution and the single `Alive -> Dead` flip
//! - Participant tracking, reward dispatch and loot rolls on death
//! - Pooled entity reuse, timers and the floor spawn director
//! - A bevy plugin hosting the simulation headless

pub mod balance;
pub mod collaborators;
pub mod combat;
pub mod constants;
pub mod content;
pub mod death;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod loot;
pub mod monster;
pub mod pool;
pub mod scheduler;
pub mod skills;
pub mod spawner;
pub mod stats;
