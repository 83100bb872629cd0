//! SeaORM entity definitions for the pvpmeta database schema.

pub mod character;
pub mod character_item;
pub mod enchant_popularity;
pub mod enchantment;
pub mod faction;
pub mod gem_popularity;
pub mod item;
pub mod item_popularity;
pub mod prelude;
pub mod pvp_leaderboard;
pub mod pvp_leaderboard_entry;
pub mod pvp_season;
pub mod pvp_sync_cycle;
pub mod sync_cycle_status;
pub mod talent;
pub mod talent_type;
pub mod translation;
