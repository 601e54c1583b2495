// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, graphql_object, graphql_value};
use uuid::Uuid;

use crate::db::models::{Ctf, CtfStatus, NewCtf, User, UserRole};
use crate::graphql::Context;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

#[derive(AsChangeset)]
#[diesel(table_name = crate::db::schema::ctfs)]
struct CtfChanges {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    status: Option<CtfStatus>,
}

fn ctf_not_found() -> juniper::FieldError {
    juniper::FieldError::new("CTF not found", graphql_value!({"code": "CTF_NOT_FOUND"}))
}

async fn find_ctf(ctx: &Context, ctf_id: Uuid) -> FieldResult<Ctf> {
    use crate::db::schema::ctfs::dsl::*;
    ctfs.filter(id.eq(ctf_id))
        .select(Ctf::as_select())
        .first::<Ctf>(&mut ctx.get_db_conn().await)
        .await
        .optional()?
        .ok_or_else(ctf_not_found)
}

#[graphql_object]
impl Ctf {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn views(&self) -> i32 {
        self.views
    }

    pub fn status(&self) -> CtfStatus {
        self.status
    }

    pub fn created_at(&self) -> String {
        self.created_at.to_rfc3339()
    }

    pub async fn organizer(&self, ctx: &Context) -> FieldResult<User> {
        use crate::db::schema::users::dsl::*;
        Ok(users
            .filter(id.eq(self.organizer_id))
            .select(User::as_select())
            .first::<User>(&mut ctx.get_db_conn().await)
            .await?)
    }
}

/// New events start PENDING and become visible once an admin approves them.
pub async fn create_ctf(
    ctx: &Context,
    title: String,
    description: Option<String>,
    location: Option<String>,
) -> FieldResult<Ctf> {
    ctx.require_role_exact(UserRole::Organizer)?;
    let current_user = ctx.require_authentication()?;

    if title.trim().is_empty() {
        return Err(juniper::FieldError::new(
            "CTF title cannot be blank",
            graphql_value!({"code": "INVALID_CTF_TITLE"}),
        ));
    }

    let ctf = diesel::insert_into(crate::db::schema::ctfs::table)
        .values(NewCtf {
            title,
            description,
            location,
            status: CtfStatus::Pending,
            organizer_id: current_user.user_id,
        })
        .returning(Ctf::as_returning())
        .get_result::<Ctf>(&mut ctx.get_db_conn().await)
        .await?;

    tracing::info!(ctf = %ctf.title, organizer = %current_user.username, "ctf submitted for review");
    Ok(ctf)
}

/// Detail fetch; bumps the view counter as part of the read.
pub async fn get_ctf(ctx: &Context, ctf_id: Uuid) -> FieldResult<Ctf> {
    use crate::db::schema::ctfs::dsl::*;
    let record = diesel::update(ctfs.filter(id.eq(ctf_id)))
        .set(views.eq(views + 1))
        .returning(Ctf::as_returning())
        .get_result::<Ctf>(&mut ctx.get_db_conn().await)
        .await
        .optional()?;

    record.ok_or_else(ctf_not_found)
}

pub async fn get_ctfs(ctx: &Context, status_filter: CtfStatus) -> FieldResult<Vec<Ctf>> {
    use crate::db::schema::ctfs::dsl::*;
    let records = ctfs
        .filter(status.eq(status_filter))
        .order(created_at.desc())
        .select(Ctf::as_select())
        .load::<Ctf>(&mut ctx.get_db_conn().await)
        .await?;
    Ok(records)
}

/// Admin decision on a submitted event; only PENDING events can be decided.
pub async fn review_ctf(ctx: &Context, ctf_id: Uuid, approve: bool) -> FieldResult<Ctf> {
    ctx.require_role_exact(UserRole::Admin)?;

    let ctf = find_ctf(ctx, ctf_id).await?;
    if ctf.status != CtfStatus::Pending {
        return Err(juniper::FieldError::new(
            "Only a pending CTF can be approved or rejected",
            graphql_value!({"code": "CTF_NOT_PENDING"}),
        ));
    }

    let new_status = if approve {
        CtfStatus::Active
    } else {
        CtfStatus::Inactive
    };

    use crate::db::schema::ctfs::dsl::*;
    Ok(diesel::update(ctfs.filter(id.eq(ctf.id)))
        .set(status.eq(new_status))
        .returning(Ctf::as_returning())
        .get_result::<Ctf>(&mut ctx.get_db_conn().await)
        .await?)
}

pub async fn disable_ctf(ctx: &Context, ctf_id: Uuid) -> FieldResult<bool> {
    let current_user = ctx.require_authentication()?;

    let ctf = find_ctf(ctx, ctf_id).await?;
    if !current_user.is_admin() && ctf.organizer_id != current_user.user_id {
        return Err(juniper::FieldError::new(
            "Only the organizer or an admin may disable this CTF",
            graphql_value!({"code": "CTF_NOT_OWNER"}),
        ));
    }

    use crate::db::schema::ctfs::dsl::*;
    diesel::update(ctfs.filter(id.eq(ctf.id)))
        .set(status.eq(CtfStatus::Inactive))
        .execute(&mut ctx.get_db_conn().await)
        .await?;
    Ok(true)
}

/// Organizer edits put the event back in the review queue; admin edits keep
/// the current status.
pub async fn update_ctf(
    ctx: &Context,
    ctf_id: Uuid,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
) -> FieldResult<Ctf> {
    let current_user = ctx.require_authentication()?;
    let is_admin = current_user.is_admin();

    let ctf = find_ctf(ctx, ctf_id).await?;
    if !is_admin {
        if ctf.status == CtfStatus::Inactive {
            return Err(juniper::FieldError::new(
                "Only an active CTF can be modified",
                graphql_value!({"code": "CTF_NOT_ACTIVE"}),
            ));
        }
        if ctf.organizer_id != current_user.user_id {
            return Err(juniper::FieldError::new(
                "Only the organizer or an admin may modify this CTF",
                graphql_value!({"code": "CTF_NOT_OWNER"}),
            ));
        }
    }

    let mut changed = false;
    let new_title = match title {
        Some(t) if t != ctf.title => {
            changed = true;
            Some(t)
        }
        _ => None,
    };
    let new_description = match description {
        Some(d) if Some(&d) != ctf.description.as_ref() => {
            changed = true;
            Some(d)
        }
        _ => None,
    };
    let new_location = match location {
        Some(l) if Some(&l) != ctf.location.as_ref() => {
            changed = true;
            Some(l)
        }
        _ => None,
    };

    if !changed {
        return Err(juniper::FieldError::new(
            "No changes detected",
            graphql_value!({"code": "NO_CHANGES"}),
        ));
    }

    use crate::db::schema::ctfs::dsl::{ctfs, id};
    Ok(diesel::update(ctfs.filter(id.eq(ctf.id)))
        .set(CtfChanges {
            title: new_title,
            description: new_description,
            location: new_location,
            status: if is_admin { None } else { Some(CtfStatus::Pending) },
        })
        .returning(Ctf::as_returning())
        .get_result::<Ctf>(&mut ctx.get_db_conn().await)
        .await?)
}
