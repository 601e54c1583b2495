// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, IntoFieldError, graphql_object, graphql_value};
use uuid::Uuid;

use crate::db::models::{CandidacyStatus, Team, TeamCandidacy, User};
use crate::membership::{self, MembershipError};

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

impl IntoFieldError for MembershipError {
    fn into_field_error(self) -> juniper::FieldError {
        if let MembershipError::Database(db_err) = &self {
            tracing::error!("membership operation failed: {db_err}");
        }
        let code = self.code();
        let kind = self.kind().as_str();
        juniper::FieldError::new(self.to_string(), graphql_value!({"code": code, "kind": kind}))
    }
}

async fn load_user(ctx: &crate::graphql::Context, user_id: Uuid) -> FieldResult<Option<User>> {
    use crate::db::schema::users::dsl::*;
    Ok(users
        .filter(id.eq(user_id))
        .select(User::as_select())
        .first::<User>(&mut ctx.get_db_conn().await)
        .await
        .optional()?)
}

#[graphql_object]
impl Team {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    pub async fn leader(&self, ctx: &crate::graphql::Context) -> FieldResult<User> {
        load_user(ctx, self.leader_id)
            .await?
            .ok_or_else(|| MembershipError::ParticipantNotFound.into_field_error())
    }

    /// Participants holding an ACCEPTED candidacy for this team.
    pub async fn members(&self, ctx: &crate::graphql::Context) -> FieldResult<Vec<User>> {
        Ok(membership::team_roster(&mut *ctx.get_db_conn().await, self.id)
            .await
            .map_err(IntoFieldError::into_field_error)?)
    }

    pub async fn member_count(&self, ctx: &crate::graphql::Context) -> FieldResult<i32> {
        let count = membership::active_member_count(&mut *ctx.get_db_conn().await, self.id)
            .await
            .map_err(IntoFieldError::into_field_error)?;
        Ok(count as i32)
    }

    /// Full candidacy records including audit fields; team leader or admin
    /// only.
    pub async fn candidacies(
        &self,
        ctx: &crate::graphql::Context,
        status: CandidacyStatus,
    ) -> FieldResult<Vec<TeamCandidacy>> {
        let current_user = ctx.require_authentication()?;
        Ok(membership::list_candidacies(
            &mut *ctx.get_db_conn().await,
            self.id,
            status,
            current_user.user_id,
            current_user.is_admin(),
        )
        .await
        .map_err(IntoFieldError::into_field_error)?)
    }
}

#[graphql_object]
impl TeamCandidacy {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn team_id(&self) -> String {
        self.team_id.to_string()
    }

    pub fn status(&self) -> CandidacyStatus {
        self.status
    }

    pub fn created_at(&self) -> String {
        self.created_at.to_rfc3339()
    }

    pub fn decided_at(&self) -> Option<String> {
        self.decided_at.map(|ts| ts.to_rfc3339())
    }

    pub fn ended_at(&self) -> Option<String> {
        self.ended_at.map(|ts| ts.to_rfc3339())
    }

    pub async fn participant(&self, ctx: &crate::graphql::Context) -> FieldResult<User> {
        load_user(ctx, self.participant_id)
            .await?
            .ok_or_else(|| MembershipError::ParticipantNotFound.into_field_error())
    }

    pub async fn decided_by(&self, ctx: &crate::graphql::Context) -> FieldResult<Option<User>> {
        match self.decided_by {
            Some(decider) => load_user(ctx, decider).await,
            None => Ok(None),
        }
    }

    pub async fn ended_by(&self, ctx: &crate::graphql::Context) -> FieldResult<Option<User>> {
        match self.ended_by {
            Some(ender) => load_user(ctx, ender).await,
            None => Ok(None),
        }
    }
}

pub async fn create_team(
    ctx: &crate::graphql::Context,
    name: String,
    logo_url: Option<String>,
) -> FieldResult<Team> {
    let current_user = ctx.require_authentication()?;

    let team = membership::create_team(
        &mut *ctx.get_db_conn().await,
        name,
        logo_url,
        current_user.user_id,
    )
    .await
    .map_err(IntoFieldError::into_field_error)?;

    tracing::info!(team = %team.name, leader = %current_user.username, "team created");
    Ok(team)
}

pub async fn request_to_join_team(
    ctx: &crate::graphql::Context,
    team_id: Uuid,
) -> FieldResult<TeamCandidacy> {
    let current_user = ctx.require_authentication()?;

    Ok(
        membership::request_to_join(&mut *ctx.get_db_conn().await, team_id, current_user.user_id)
            .await
            .map_err(IntoFieldError::into_field_error)?,
    )
}

pub async fn respond_to_candidacy(
    ctx: &crate::graphql::Context,
    candidacy_id: Uuid,
    accept: bool,
) -> FieldResult<TeamCandidacy> {
    let current_user = ctx.require_authentication()?;

    Ok(membership::respond_to_candidacy(
        &mut *ctx.get_db_conn().await,
        candidacy_id,
        accept,
        current_user.user_id,
    )
    .await
    .map_err(IntoFieldError::into_field_error)?)
}

pub async fn leave_team(ctx: &crate::graphql::Context, team_id: Uuid) -> FieldResult<bool> {
    let current_user = ctx.require_authentication()?;

    membership::leave_team(&mut *ctx.get_db_conn().await, team_id, current_user.user_id)
        .await
        .map_err(IntoFieldError::into_field_error)?;
    Ok(true)
}

pub async fn kick_member(
    ctx: &crate::graphql::Context,
    team_id: Uuid,
    user_id: Uuid,
) -> FieldResult<bool> {
    let current_user = ctx.require_authentication()?;

    membership::kick_member(
        &mut *ctx.get_db_conn().await,
        team_id,
        user_id,
        current_user.user_id,
    )
    .await
    .map_err(IntoFieldError::into_field_error)?;
    Ok(true)
}

pub async fn transfer_leadership(
    ctx: &crate::graphql::Context,
    team_id: Uuid,
    new_leader_id: Uuid,
) -> FieldResult<Team> {
    let current_user = ctx.require_authentication()?;

    let team = membership::transfer_leadership(
        &mut *ctx.get_db_conn().await,
        team_id,
        current_user.user_id,
        new_leader_id,
    )
    .await
    .map_err(IntoFieldError::into_field_error)?;

    tracing::info!(team = %team.name, new_leader = %new_leader_id, "leadership transferred");
    Ok(team)
}

pub async fn get_teams(ctx: &crate::graphql::Context) -> FieldResult<Vec<Team>> {
    let team_records = crate::db::schema::teams::table
        .select(Team::as_select())
        .load::<Team>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(team_records)
}

pub async fn get_team(ctx: &crate::graphql::Context, team_id: Uuid) -> FieldResult<Team> {
    use crate::db::schema::teams::dsl::*;
    let team_record = teams
        .filter(id.eq(team_id))
        .select(Team::as_select())
        .first::<Team>(&mut ctx.get_db_conn().await)
        .await
        .optional()?;

    team_record.ok_or_else(|| MembershipError::TeamNotFound.into_field_error())
}
