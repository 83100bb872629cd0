//! Common re-exports for convenient entity usage.

pub use super::character::{
    ActiveModel as CharacterActiveModel, Column as CharacterColumn, Entity as Character,
    Model as CharacterModel,
};
pub use super::character_item::{
    ActiveModel as CharacterItemActiveModel, Column as CharacterItemColumn,
    Entity as CharacterItem, Model as CharacterItemModel, Socket,
};
pub use super::enchant_popularity::{
    ActiveModel as EnchantPopularityActiveModel, Column as EnchantPopularityColumn,
    Entity as EnchantPopularity, Model as EnchantPopularityModel,
};
pub use super::enchantment::{
    ActiveModel as EnchantmentActiveModel, Column as EnchantmentColumn, Entity as Enchantment,
    Model as EnchantmentModel,
};
pub use super::faction::Faction;
pub use super::gem_popularity::{
    ActiveModel as GemPopularityActiveModel, Column as GemPopularityColumn,
    Entity as GemPopularity, Model as GemPopularityModel,
};
pub use super::item::{
    ActiveModel as ItemActiveModel, Column as ItemColumn, Entity as Item, Model as ItemModel,
};
pub use super::item_popularity::{
    ActiveModel as ItemPopularityActiveModel, Column as ItemPopularityColumn,
    Entity as ItemPopularity, Model as ItemPopularityModel,
};
pub use super::pvp_leaderboard::{
    ActiveModel as PvpLeaderboardActiveModel, Column as PvpLeaderboardColumn,
    Entity as PvpLeaderboard, Model as PvpLeaderboardModel,
};
pub use super::pvp_leaderboard_entry::{
    ActiveModel as PvpLeaderboardEntryActiveModel, Column as PvpLeaderboardEntryColumn,
    Entity as PvpLeaderboardEntry, Model as PvpLeaderboardEntryModel,
};
pub use super::pvp_season::{
    ActiveModel as PvpSeasonActiveModel, Column as PvpSeasonColumn, Entity as PvpSeason,
    Model as PvpSeasonModel,
};
pub use super::pvp_sync_cycle::{
    ActiveModel as PvpSyncCycleActiveModel, Column as PvpSyncCycleColumn,
    Entity as PvpSyncCycle, Model as PvpSyncCycleModel,
};
pub use super::sync_cycle_status::SyncCycleStatus;
pub use super::talent::{
    ActiveModel as TalentActiveModel, Column as TalentColumn, Entity as Talent,
    Model as TalentModel,
};
pub use super::talent_type::TalentType;
pub use super::translation::{
    ActiveModel as TranslationActiveModel, Column as TranslationColumn, Entity as Translation,
    Model as TranslationModel,
};
