//! Initial migration to create the pvpmeta database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_catalog(manager).await?;
        self.create_characters(manager).await?;
        self.create_seasons_and_leaderboards(manager).await?;
        self.create_character_items(manager).await?;
        self.create_sync_cycles(manager).await?;
        self.create_popularity(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let tables: Vec<DynIden> = vec![
            GemPopularity::Table.into_iden(),
            EnchantPopularity::Table.into_iden(),
            ItemPopularity::Table.into_iden(),
            PvpSyncCycles::Table.into_iden(),
            CharacterItems::Table.into_iden(),
            PvpLeaderboardEntries::Table.into_iden(),
            PvpLeaderboards::Table.into_iden(),
            PvpSeasons::Table.into_iden(),
            Characters::Table.into_iden(),
            Translations::Table.into_iden(),
            Talents::Table.into_iden(),
            Enchantments::Table.into_iden(),
            Items::Table.into_iden(),
        ];
        for table in tables {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// `id BIGINT PRIMARY KEY AUTOINCREMENT`.
fn pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn nullable_timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().null().to_owned()
}

impl Migration {
    async fn create_catalog(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(pk(Items::Id))
                    .col(
                        ColumnDef::new(Items::BlizzardId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Items::InventoryType).string().null())
                    .col(ColumnDef::new(Items::ItemClass).string().null())
                    .col(ColumnDef::new(Items::ItemSubclass).string().null())
                    .col(ColumnDef::new(Items::Quality).string().null())
                    .col(ColumnDef::new(Items::BlizzardMediaId).big_integer().null())
                    .col(ColumnDef::new(Items::IconUrl).text().null())
                    .col(nullable_timestamp(Items::MetaSyncedAt))
                    .col(timestamp(Items::CreatedAt))
                    .col(timestamp(Items::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enchantments::Table)
                    .if_not_exists()
                    .col(pk(Enchantments::Id))
                    .col(
                        ColumnDef::new(Enchantments::BlizzardId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(nullable_timestamp(Enchantments::MetaSyncedAt))
                    .col(timestamp(Enchantments::CreatedAt))
                    .col(timestamp(Enchantments::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Talents::Table)
                    .if_not_exists()
                    .col(pk(Talents::Id))
                    .col(ColumnDef::new(Talents::BlizzardId).big_integer().not_null())
                    .col(ColumnDef::new(Talents::TalentType).string().not_null())
                    .col(ColumnDef::new(Talents::SpellId).big_integer().null())
                    .col(nullable_timestamp(Talents::MetaSyncedAt))
                    .col(timestamp(Talents::CreatedAt))
                    .col(timestamp(Talents::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_talents_blizzard_id_type")
                    .table(Talents::Table)
                    .col(Talents::BlizzardId)
                    .col(Talents::TalentType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Translations::Table)
                    .if_not_exists()
                    .col(pk(Translations::Id))
                    .col(
                        ColumnDef::new(Translations::TranslatableType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Translations::TranslatableId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Translations::Key).string().not_null())
                    .col(ColumnDef::new(Translations::Locale).string().not_null())
                    .col(ColumnDef::new(Translations::Value).text().not_null())
                    .col(timestamp(Translations::CreatedAt))
                    .col(timestamp(Translations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_translations_owner_key_locale")
                    .table(Translations::Table)
                    .col(Translations::TranslatableType)
                    .col(Translations::TranslatableId)
                    .col(Translations::Key)
                    .col(Translations::Locale)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_characters(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Characters::Table)
                    .if_not_exists()
                    .col(pk(Characters::Id))
                    // Identity
                    .col(
                        ColumnDef::new(Characters::BlizzardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Characters::Region).string().not_null())
                    .col(ColumnDef::new(Characters::Realm).string().not_null())
                    .col(ColumnDef::new(Characters::Name).string().not_null())
                    .col(ColumnDef::new(Characters::Faction).string().null())
                    // Profile
                    .col(ColumnDef::new(Characters::ClassId).integer().null())
                    .col(ColumnDef::new(Characters::ClassSlug).string().null())
                    .col(ColumnDef::new(Characters::Race).string().null())
                    .col(ColumnDef::new(Characters::RaceId).integer().null())
                    .col(ColumnDef::new(Characters::AvatarUrl).text().null())
                    .col(ColumnDef::new(Characters::InsetUrl).text().null())
                    .col(ColumnDef::new(Characters::MainRawUrl).text().null())
                    .col(
                        ColumnDef::new(Characters::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // Sync state
                    .col(
                        ColumnDef::new(Characters::EquipmentFingerprint)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Characters::EquipmentLastModified)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Characters::TalentsLastModified)
                            .string()
                            .null(),
                    )
                    .col(nullable_timestamp(Characters::LastEquipmentSnapshotAt))
                    .col(nullable_timestamp(Characters::MetaSyncedAt))
                    .col(nullable_timestamp(Characters::UnavailableUntil))
                    .col(timestamp(Characters::CreatedAt))
                    .col(timestamp(Characters::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_characters_blizzard_id_region")
                    .table(Characters::Table)
                    .col(Characters::BlizzardId)
                    .col(Characters::Region)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_characters_region_realm_name")
                    .table(Characters::Table)
                    .col(Characters::Region)
                    .col(Characters::Realm)
                    .col(Characters::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_seasons_and_leaderboards(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PvpSeasons::Table)
                    .if_not_exists()
                    .col(pk(PvpSeasons::Id))
                    .col(
                        ColumnDef::new(PvpSeasons::BlizzardId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PvpSeasons::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(PvpSeasons::IsCurrent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(PvpSeasons::CreatedAt))
                    .col(timestamp(PvpSeasons::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PvpLeaderboards::Table)
                    .if_not_exists()
                    .col(pk(PvpLeaderboards::Id))
                    .col(
                        ColumnDef::new(PvpLeaderboards::PvpSeasonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PvpLeaderboards::Bracket).string().not_null())
                    .col(ColumnDef::new(PvpLeaderboards::Region).string().not_null())
                    .col(nullable_timestamp(PvpLeaderboards::LastSyncedAt))
                    .col(timestamp(PvpLeaderboards::CreatedAt))
                    .col(timestamp(PvpLeaderboards::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pvp_leaderboards_season")
                            .from(PvpLeaderboards::Table, PvpLeaderboards::PvpSeasonId)
                            .to(PvpSeasons::Table, PvpSeasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pvp_leaderboards_season_bracket_region")
                    .table(PvpLeaderboards::Table)
                    .col(PvpLeaderboards::PvpSeasonId)
                    .col(PvpLeaderboards::Bracket)
                    .col(PvpLeaderboards::Region)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PvpLeaderboardEntries::Table)
                    .if_not_exists()
                    .col(pk(PvpLeaderboardEntries::Id))
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::PvpLeaderboardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::CharacterId)
                            .big_integer()
                            .not_null(),
                    )
                    // Standing
                    .col(ColumnDef::new(PvpLeaderboardEntries::Rank).integer().not_null())
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::Rating)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::Wins)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::Losses)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::SnapshotAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Equipment enrichment
                    .col(ColumnDef::new(PvpLeaderboardEntries::ItemLevel).integer().null())
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::TierSetId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::TierSetName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::TierSetPieces)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::Tier4pActive)
                            .boolean()
                            .null(),
                    )
                    .col(ColumnDef::new(PvpLeaderboardEntries::RawEquipment).json().null())
                    .col(nullable_timestamp(
                        PvpLeaderboardEntries::EquipmentProcessedAt,
                    ))
                    // Specialization enrichment
                    .col(ColumnDef::new(PvpLeaderboardEntries::SpecId).integer().null())
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::HeroTalentTreeId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::HeroTalentTreeName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PvpLeaderboardEntries::RawSpecialization)
                            .json()
                            .null(),
                    )
                    .col(nullable_timestamp(
                        PvpLeaderboardEntries::SpecializationProcessedAt,
                    ))
                    .col(timestamp(PvpLeaderboardEntries::CreatedAt))
                    .col(timestamp(PvpLeaderboardEntries::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pvp_entries_leaderboard")
                            .from(
                                PvpLeaderboardEntries::Table,
                                PvpLeaderboardEntries::PvpLeaderboardId,
                            )
                            .to(PvpLeaderboards::Table, PvpLeaderboards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pvp_entries_character")
                            .from(
                                PvpLeaderboardEntries::Table,
                                PvpLeaderboardEntries::CharacterId,
                            )
                            .to(Characters::Table, Characters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Current-snapshot lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_pvp_entries_leaderboard_character_snapshot")
                    .table(PvpLeaderboardEntries::Table)
                    .col(PvpLeaderboardEntries::PvpLeaderboardId)
                    .col(PvpLeaderboardEntries::CharacterId)
                    .col(PvpLeaderboardEntries::SnapshotAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pvp_entries_character_processed")
                    .table(PvpLeaderboardEntries::Table)
                    .col(PvpLeaderboardEntries::CharacterId)
                    .col(PvpLeaderboardEntries::EquipmentProcessedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_character_items(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterItems::Table)
                    .if_not_exists()
                    .col(pk(CharacterItems::Id))
                    .col(
                        ColumnDef::new(CharacterItems::CharacterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CharacterItems::Slot).string().not_null())
                    .col(ColumnDef::new(CharacterItems::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(CharacterItems::ItemLevel).integer().not_null())
                    .col(
                        ColumnDef::new(CharacterItems::EnchantmentId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CharacterItems::Sockets)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(CharacterItems::BonusList)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(timestamp(CharacterItems::CreatedAt))
                    .col(timestamp(CharacterItems::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_character_items_character")
                            .from(CharacterItems::Table, CharacterItems::CharacterId)
                            .to(Characters::Table, Characters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_character_items_item")
                            .from(CharacterItems::Table, CharacterItems::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_character_items_character_slot")
                    .table(CharacterItems::Table)
                    .col(CharacterItems::CharacterId)
                    .col(CharacterItems::Slot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_sync_cycles(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PvpSyncCycles::Table)
                    .if_not_exists()
                    .col(pk(PvpSyncCycles::Id))
                    .col(
                        ColumnDef::new(PvpSyncCycles::PvpSeasonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PvpSyncCycles::Status)
                            .string()
                            .not_null()
                            .default("syncing_leaderboards"),
                    )
                    .col(
                        ColumnDef::new(PvpSyncCycles::Regions)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(PvpSyncCycles::SnapshotAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PvpSyncCycles::ExpectedCharacterBatches)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PvpSyncCycles::CompletedCharacterBatches)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(nullable_timestamp(PvpSyncCycles::CompletedAt))
                    .col(timestamp(PvpSyncCycles::CreatedAt))
                    .col(timestamp(PvpSyncCycles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pvp_sync_cycles_season")
                            .from(PvpSyncCycles::Table, PvpSyncCycles::PvpSeasonId)
                            .to(PvpSeasons::Table, PvpSeasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_popularity(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemPopularity::Table)
                    .if_not_exists()
                    .col(pk(ItemPopularity::Id))
                    .col(
                        ColumnDef::new(ItemPopularity::PvpSeasonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemPopularity::Bracket).string().not_null())
                    .col(ColumnDef::new(ItemPopularity::SpecId).integer().not_null())
                    .col(ColumnDef::new(ItemPopularity::Slot).string().not_null())
                    .col(ColumnDef::new(ItemPopularity::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(ItemPopularity::UsageCount).integer().not_null())
                    .col(ColumnDef::new(ItemPopularity::UsagePct).double().not_null())
                    .col(
                        ColumnDef::new(ItemPopularity::SnapshotAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_popularity_unique")
                    .table(ItemPopularity::Table)
                    .col(ItemPopularity::PvpSeasonId)
                    .col(ItemPopularity::Bracket)
                    .col(ItemPopularity::SpecId)
                    .col(ItemPopularity::Slot)
                    .col(ItemPopularity::ItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnchantPopularity::Table)
                    .if_not_exists()
                    .col(pk(EnchantPopularity::Id))
                    .col(
                        ColumnDef::new(EnchantPopularity::PvpSeasonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EnchantPopularity::Bracket).string().not_null())
                    .col(ColumnDef::new(EnchantPopularity::SpecId).integer().not_null())
                    .col(ColumnDef::new(EnchantPopularity::Slot).string().not_null())
                    .col(
                        ColumnDef::new(EnchantPopularity::EnchantmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EnchantPopularity::UsageCount)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EnchantPopularity::UsagePct).double().not_null())
                    .col(
                        ColumnDef::new(EnchantPopularity::SnapshotAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enchant_popularity_unique")
                    .table(EnchantPopularity::Table)
                    .col(EnchantPopularity::PvpSeasonId)
                    .col(EnchantPopularity::Bracket)
                    .col(EnchantPopularity::SpecId)
                    .col(EnchantPopularity::Slot)
                    .col(EnchantPopularity::EnchantmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GemPopularity::Table)
                    .if_not_exists()
                    .col(pk(GemPopularity::Id))
                    .col(
                        ColumnDef::new(GemPopularity::PvpSeasonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GemPopularity::Bracket).string().not_null())
                    .col(ColumnDef::new(GemPopularity::SpecId).integer().not_null())
                    .col(ColumnDef::new(GemPopularity::Slot).string().not_null())
                    .col(ColumnDef::new(GemPopularity::SocketType).string().not_null())
                    .col(ColumnDef::new(GemPopularity::ItemId).big_integer().not_null())
                    .col(ColumnDef::new(GemPopularity::UsageCount).integer().not_null())
                    .col(ColumnDef::new(GemPopularity::UsagePct).double().not_null())
                    .col(
                        ColumnDef::new(GemPopularity::SnapshotAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gem_popularity_unique")
                    .table(GemPopularity::Table)
                    .col(GemPopularity::PvpSeasonId)
                    .col(GemPopularity::Bracket)
                    .col(GemPopularity::SpecId)
                    .col(GemPopularity::Slot)
                    .col(GemPopularity::SocketType)
                    .col(GemPopularity::ItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    BlizzardId,
    InventoryType,
    ItemClass,
    ItemSubclass,
    Quality,
    BlizzardMediaId,
    IconUrl,
    MetaSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enchantments {
    Table,
    Id,
    BlizzardId,
    MetaSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Talents {
    Table,
    Id,
    BlizzardId,
    TalentType,
    SpellId,
    MetaSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Translations {
    Table,
    Id,
    TranslatableType,
    TranslatableId,
    Key,
    Locale,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Characters {
    Table,
    Id,
    BlizzardId,
    Region,
    Realm,
    Name,
    Faction,
    ClassId,
    ClassSlug,
    Race,
    RaceId,
    AvatarUrl,
    InsetUrl,
    MainRawUrl,
    IsPrivate,
    EquipmentFingerprint,
    EquipmentLastModified,
    TalentsLastModified,
    LastEquipmentSnapshotAt,
    MetaSyncedAt,
    UnavailableUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PvpSeasons {
    Table,
    Id,
    BlizzardId,
    DisplayName,
    IsCurrent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PvpLeaderboards {
    Table,
    Id,
    PvpSeasonId,
    Bracket,
    Region,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PvpLeaderboardEntries {
    Table,
    Id,
    PvpLeaderboardId,
    CharacterId,
    Rank,
    Rating,
    Wins,
    Losses,
    SnapshotAt,
    ItemLevel,
    TierSetId,
    TierSetName,
    TierSetPieces,
    #[sea_orm(iden = "tier_4p_active")]
    Tier4pActive,
    RawEquipment,
    EquipmentProcessedAt,
    SpecId,
    HeroTalentTreeId,
    HeroTalentTreeName,
    RawSpecialization,
    SpecializationProcessedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CharacterItems {
    Table,
    Id,
    CharacterId,
    Slot,
    ItemId,
    ItemLevel,
    EnchantmentId,
    Sockets,
    BonusList,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PvpSyncCycles {
    Table,
    Id,
    PvpSeasonId,
    Status,
    Regions,
    SnapshotAt,
    ExpectedCharacterBatches,
    CompletedCharacterBatches,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "pvp_meta_item_popularity")]
enum ItemPopularity {
    Table,
    Id,
    PvpSeasonId,
    Bracket,
    SpecId,
    Slot,
    ItemId,
    UsageCount,
    UsagePct,
    SnapshotAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "pvp_meta_enchant_popularity")]
enum EnchantPopularity {
    Table,
    Id,
    PvpSeasonId,
    Bracket,
    SpecId,
    Slot,
    EnchantmentId,
    UsageCount,
    UsagePct,
    SnapshotAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "pvp_meta_gem_popularity")]
enum GemPopularity {
    Table,
    Id,
    PvpSeasonId,
    Bracket,
    SpecId,
    Slot,
    SocketType,
    ItemId,
    UsageCount,
    UsagePct,
    SnapshotAt,
}
