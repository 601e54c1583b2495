// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, graphql_object, graphql_value};
use uuid::Uuid;

use crate::db::models::{Ctf, CtfComment, NewCtfComment, User};
use crate::graphql::Context;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

const MAX_COMMENT_LENGTH: usize = 2000;

#[graphql_object]
impl CtfComment {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn posted_at(&self) -> String {
        self.posted_at.to_rfc3339()
    }

    pub async fn author(&self, ctx: &Context) -> FieldResult<User> {
        use crate::db::schema::users::dsl::*;
        Ok(users
            .filter(id.eq(self.user_id))
            .select(User::as_select())
            .first::<User>(&mut ctx.get_db_conn().await)
            .await?)
    }

    pub async fn ctf(&self, ctx: &Context) -> FieldResult<Ctf> {
        use crate::db::schema::ctfs::dsl::*;
        Ok(ctfs
            .filter(id.eq(self.ctf_id))
            .select(Ctf::as_select())
            .first::<Ctf>(&mut ctx.get_db_conn().await)
            .await?)
    }
}

pub async fn add_comment(
    ctx: &Context,
    ctf_id: Uuid,
    content: String,
) -> FieldResult<CtfComment> {
    let current_user = ctx.require_authentication()?;

    if content.trim().is_empty() {
        return Err(juniper::FieldError::new(
            "Comment cannot be blank",
            graphql_value!({"code": "INVALID_COMMENT"}),
        ));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(juniper::FieldError::new(
            "Comment is too long",
            graphql_value!({"code": "COMMENT_TOO_LONG"}),
        ));
    }

    // The CTF must exist; the FK would catch it, but we want the 404 shape.
    let ctf_exists: bool = {
        use crate::db::schema::ctfs::dsl::*;
        diesel::select(diesel::dsl::exists(ctfs.filter(id.eq(ctf_id))))
            .get_result(&mut ctx.get_db_conn().await)
            .await?
    };
    if !ctf_exists {
        return Err(juniper::FieldError::new(
            "CTF not found",
            graphql_value!({"code": "CTF_NOT_FOUND"}),
        ));
    }

    let comment = diesel::insert_into(crate::db::schema::ctf_comments::table)
        .values(NewCtfComment {
            ctf_id,
            user_id: current_user.user_id,
            content,
        })
        .returning(CtfComment::as_returning())
        .get_result::<CtfComment>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(comment)
}

pub async fn get_comments_for_ctf(ctx: &Context, for_ctf: Uuid) -> FieldResult<Vec<CtfComment>> {
    let ctf_exists: bool = {
        use crate::db::schema::ctfs::dsl::*;
        diesel::select(diesel::dsl::exists(ctfs.filter(id.eq(for_ctf))))
            .get_result(&mut ctx.get_db_conn().await)
            .await?
    };
    if !ctf_exists {
        return Err(juniper::FieldError::new(
            "CTF not found",
            graphql_value!({"code": "CTF_NOT_FOUND"}),
        ));
    }

    use crate::db::schema::ctf_comments::dsl::*;
    Ok(ctf_comments
        .filter(ctf_id.eq(for_ctf))
        .order(posted_at.asc())
        .select(CtfComment::as_select())
        .load::<CtfComment>(&mut ctx.get_db_conn().await)
        .await?)
}

pub async fn get_comments_for_user(ctx: &Context, for_user: Uuid) -> FieldResult<Vec<CtfComment>> {
    let user_exists: bool = {
        use crate::db::schema::users::dsl::*;
        diesel::select(diesel::dsl::exists(users.filter(id.eq(for_user))))
            .get_result(&mut ctx.get_db_conn().await)
            .await?
    };
    if !user_exists {
        return Err(juniper::FieldError::new(
            "User not found",
            graphql_value!({"code": "USER_NOT_FOUND"}),
        ));
    }

    use crate::db::schema::ctf_comments::dsl::*;
    Ok(ctf_comments
        .filter(user_id.eq(for_user))
        .order(posted_at.asc())
        .select(CtfComment::as_select())
        .load::<CtfComment>(&mut ctx.get_db_conn().await)
        .await?)
}
