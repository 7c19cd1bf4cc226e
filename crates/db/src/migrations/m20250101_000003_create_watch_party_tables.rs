//! Create `watch_party`, `watch_party_participant`, and
//! `watch_party_suggestion` tables.
//!
//! Participants and suggestions cascade with their party; the aggregate
//! boundary is expressed in the schema rather than in application cleanup.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create watch_party table
        manager
            .create_table(
                Table::create()
                    .table(WatchParty::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchParty::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WatchParty::HostId).string_len(32).not_null())
                    .col(ColumnDef::new(WatchParty::MovieId).string_len(32))
                    .col(ColumnDef::new(WatchParty::Title).string_len(200).not_null())
                    .col(ColumnDef::new(WatchParty::Description).text())
                    .col(
                        ColumnDef::new(WatchParty::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WatchParty::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(WatchParty::EndedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(WatchParty::Status)
                            .string_len(20)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(WatchParty::MaxParticipants).integer())
                    .col(
                        ColumnDef::new(WatchParty::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(WatchParty::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(WatchParty::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_host")
                            .from(WatchParty::Table, WatchParty::HostId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_movie")
                            .from(WatchParty::Table, WatchParty::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_party_host_id")
                    .table(WatchParty::Table)
                    .col(WatchParty::HostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_party_status_scheduled_at")
                    .table(WatchParty::Table)
                    .col(WatchParty::Status)
                    .col(WatchParty::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        // Create watch_party_participant table
        manager
            .create_table(
                Table::create()
                    .table(WatchPartyParticipant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchPartyParticipant::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WatchPartyParticipant::PartyId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchPartyParticipant::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchPartyParticipant::Status)
                            .string_len(20)
                            .not_null()
                            .default("invited"),
                    )
                    .col(ColumnDef::new(WatchPartyParticipant::VotedMovieId).string_len(32))
                    .col(ColumnDef::new(WatchPartyParticipant::JoinedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(WatchPartyParticipant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(WatchPartyParticipant::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_participant_party")
                            .from(WatchPartyParticipant::Table, WatchPartyParticipant::PartyId)
                            .to(WatchParty::Table, WatchParty::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_participant_user")
                            .from(WatchPartyParticipant::Table, WatchPartyParticipant::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership row per (party, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_watch_party_participant_party_user")
                    .table(WatchPartyParticipant::Table)
                    .col(WatchPartyParticipant::PartyId)
                    .col(WatchPartyParticipant::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_party_participant_user_id")
                    .table(WatchPartyParticipant::Table)
                    .col(WatchPartyParticipant::UserId)
                    .to_owned(),
            )
            .await?;

        // Create watch_party_suggestion table
        manager
            .create_table(
                Table::create()
                    .table(WatchPartySuggestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchPartySuggestion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WatchPartySuggestion::PartyId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchPartySuggestion::MovieId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchPartySuggestion::SuggestedById)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchPartySuggestion::VoteCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(WatchPartySuggestion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_suggestion_party")
                            .from(WatchPartySuggestion::Table, WatchPartySuggestion::PartyId)
                            .to(WatchParty::Table, WatchParty::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_suggestion_movie")
                            .from(WatchPartySuggestion::Table, WatchPartySuggestion::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_party_suggestion_user")
                            .from(WatchPartySuggestion::Table, WatchPartySuggestion::SuggestedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One suggestion row per (party, movie)
        manager
            .create_index(
                Index::create()
                    .name("idx_watch_party_suggestion_party_movie")
                    .table(WatchPartySuggestion::Table)
                    .col(WatchPartySuggestion::PartyId)
                    .col(WatchPartySuggestion::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WatchPartySuggestion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WatchPartyParticipant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WatchParty::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WatchParty {
    Table,
    Id,
    HostId,
    MovieId,
    Title,
    Description,
    ScheduledAt,
    StartedAt,
    EndedAt,
    Status,
    MaxParticipants,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WatchPartyParticipant {
    Table,
    Id,
    PartyId,
    UserId,
    Status,
    VotedMovieId,
    JoinedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WatchPartySuggestion {
    Table,
    Id,
    PartyId,
    MovieId,
    SuggestedById,
    VoteCount,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
}
