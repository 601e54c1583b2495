// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use super::Context;

pub struct Query;

#[graphql_object]
#[graphql(context = Context)]
impl Query {
    fn is_authenticated(context: &Context) -> bool {
        context.is_authenticated()
    }

    async fn me(context: &Context) -> juniper::FieldResult<Option<crate::db::models::User>> {
        crate::graphql::handlers::users::get_current_user(context).await
    }

    async fn users(context: &Context) -> juniper::FieldResult<Vec<crate::db::models::User>> {
        crate::graphql::handlers::users::get_all_users(context).await
    }

    async fn user_by_id(
        context: &Context,
        user_id: String,
    ) -> juniper::FieldResult<Option<crate::db::models::User>> {
        let user_id = uuid::Uuid::parse_str(&user_id)?;
        crate::graphql::handlers::users::get_user_by_id(user_id, context).await
    }

    async fn participants(
        context: &Context,
    ) -> juniper::FieldResult<Vec<crate::db::models::User>> {
        crate::graphql::handlers::users::get_participants(context).await
    }

    async fn organizers(context: &Context) -> juniper::FieldResult<Vec<crate::db::models::User>> {
        crate::graphql::handlers::users::get_organizers(context).await
    }

    async fn teams(context: &Context) -> juniper::FieldResult<Vec<crate::db::models::Team>> {
        crate::graphql::handlers::teams::get_teams(context).await
    }

    async fn team(
        context: &Context,
        team_id: String,
    ) -> juniper::FieldResult<crate::db::models::Team> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        crate::graphql::handlers::teams::get_team(context, team_id).await
    }

    async fn ctfs(
        context: &Context,
        status: crate::db::models::CtfStatus,
    ) -> juniper::FieldResult<Vec<crate::db::models::Ctf>> {
        crate::graphql::handlers::ctfs::get_ctfs(context, status).await
    }

    /// Fetching a CTF through this query counts as a view.
    async fn ctf(
        context: &Context,
        ctf_id: String,
    ) -> juniper::FieldResult<crate::db::models::Ctf> {
        let ctf_id = uuid::Uuid::parse_str(&ctf_id)?;
        crate::graphql::handlers::ctfs::get_ctf(context, ctf_id).await
    }

    async fn challenges(
        context: &Context,
    ) -> juniper::FieldResult<Vec<crate::db::models::Challenge>> {
        crate::graphql::handlers::challenges::get_challenges(context).await
    }

    async fn challenge(
        context: &Context,
        challenge_id: String,
    ) -> juniper::FieldResult<crate::db::models::Challenge> {
        let challenge_id = uuid::Uuid::parse_str(&challenge_id)?;
        crate::graphql::handlers::challenges::get_challenge(context, challenge_id).await
    }

    async fn comments_for_ctf(
        context: &Context,
        ctf_id: String,
    ) -> juniper::FieldResult<Vec<crate::db::models::CtfComment>> {
        let ctf_id = uuid::Uuid::parse_str(&ctf_id)?;
        crate::graphql::handlers::comments::get_comments_for_ctf(context, ctf_id).await
    }

    async fn comments_for_user(
        context: &Context,
        user_id: String,
    ) -> juniper::FieldResult<Vec<crate::db::models::CtfComment>> {
        let user_id = uuid::Uuid::parse_str(&user_id)?;
        crate::graphql::handlers::comments::get_comments_for_user(context, user_id).await
    }
}
