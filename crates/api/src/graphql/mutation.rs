// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, graphql_object};

use crate::graphql::handlers::{self, sessions::SessionCredentials};

use super::Context;

pub struct Mutation;

#[graphql_object]
#[graphql(
    context = Context,
)]
impl Mutation {
    async fn login(
        context: &Context,
        email: String,
        password: String,
    ) -> FieldResult<SessionCredentials> {
        handlers::users::login_user(email, password, context).await
    }

    async fn create_user(
        context: &Context,
        username: String,
        email: String,
        password: String,
    ) -> FieldResult<bool> {
        handlers::users::create_user(username, email, password, context).await
    }

    async fn create_organizer(
        context: &Context,
        username: String,
        email: String,
        password: String,
        organization: String,
    ) -> FieldResult<bool> {
        handlers::users::create_organizer(username, email, password, organization, context).await
    }

    async fn create_admin(
        context: &Context,
        username: String,
        email: String,
        password: String,
    ) -> FieldResult<bool> {
        handlers::users::create_admin(username, email, password, context).await
    }

    async fn refresh_session(
        context: &Context,
        refresh_token: String,
    ) -> FieldResult<SessionCredentials> {
        handlers::sessions::refresh_session(context, refresh_token).await
    }

    async fn end_session(context: &Context, refresh_token: String) -> FieldResult<bool> {
        handlers::sessions::end_session(context, refresh_token).await
    }

    async fn ban_user(
        context: &Context,
        user_id: String,
        reason: Option<String>,
    ) -> FieldResult<bool> {
        let user_id = uuid::Uuid::parse_str(&user_id)?;
        handlers::users::ban_user(context, user_id, reason).await
    }

    async fn create_team(
        context: &Context,
        name: String,
        logo_url: Option<String>,
    ) -> FieldResult<crate::db::models::Team> {
        handlers::teams::create_team(context, name, logo_url).await
    }

    async fn request_to_join_team(
        context: &Context,
        team_id: String,
    ) -> FieldResult<crate::db::models::TeamCandidacy> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        handlers::teams::request_to_join_team(context, team_id).await
    }

    async fn respond_to_candidacy(
        context: &Context,
        candidacy_id: String,
        accept: bool,
    ) -> FieldResult<crate::db::models::TeamCandidacy> {
        let candidacy_id = uuid::Uuid::parse_str(&candidacy_id)?;
        handlers::teams::respond_to_candidacy(context, candidacy_id, accept).await
    }

    async fn leave_team(context: &Context, team_id: String) -> FieldResult<bool> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        handlers::teams::leave_team(context, team_id).await
    }

    async fn kick_member(
        context: &Context,
        team_id: String,
        user_id: String,
    ) -> FieldResult<bool> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        let user_id = uuid::Uuid::parse_str(&user_id)?;
        handlers::teams::kick_member(context, team_id, user_id).await
    }

    async fn transfer_leadership(
        context: &Context,
        team_id: String,
        new_leader_id: String,
    ) -> FieldResult<crate::db::models::Team> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        let new_leader_id = uuid::Uuid::parse_str(&new_leader_id)?;
        handlers::teams::transfer_leadership(context, team_id, new_leader_id).await
    }

    async fn create_ctf(
        context: &Context,
        title: String,
        description: Option<String>,
        location: Option<String>,
    ) -> FieldResult<crate::db::models::Ctf> {
        handlers::ctfs::create_ctf(context, title, description, location).await
    }

    async fn review_ctf(
        context: &Context,
        ctf_id: String,
        approve: bool,
    ) -> FieldResult<crate::db::models::Ctf> {
        let ctf_id = uuid::Uuid::parse_str(&ctf_id)?;
        handlers::ctfs::review_ctf(context, ctf_id, approve).await
    }

    async fn disable_ctf(context: &Context, ctf_id: String) -> FieldResult<bool> {
        let ctf_id = uuid::Uuid::parse_str(&ctf_id)?;
        handlers::ctfs::disable_ctf(context, ctf_id).await
    }

    async fn update_ctf(
        context: &Context,
        ctf_id: String,
        title: Option<String>,
        description: Option<String>,
        location: Option<String>,
    ) -> FieldResult<crate::db::models::Ctf> {
        let ctf_id = uuid::Uuid::parse_str(&ctf_id)?;
        handlers::ctfs::update_ctf(context, ctf_id, title, description, location).await
    }

    async fn create_challenge(
        context: &Context,
        title: String,
        points: i32,
    ) -> FieldResult<crate::db::models::Challenge> {
        handlers::challenges::create_challenge(context, title, points).await
    }

    async fn add_comment(
        context: &Context,
        ctf_id: String,
        content: String,
    ) -> FieldResult<crate::db::models::CtfComment> {
        let ctf_id = uuid::Uuid::parse_str(&ctf_id)?;
        handlers::comments::add_comment(context, ctf_id, content).await
    }
}
