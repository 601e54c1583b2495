// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, graphql_object, graphql_value};
use uuid::Uuid;

use crate::db::models::{Challenge, NewChallenge, UserRole};
use crate::graphql::Context;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

#[graphql_object]
impl Challenge {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn created_at(&self) -> String {
        self.created_at.to_rfc3339()
    }
}

fn challenge_exists_error() -> juniper::FieldError {
    juniper::FieldError::new(
        "A challenge with this title already exists",
        graphql_value!({"code": "CHALLENGE_ALREADY_EXISTS"}),
    )
}

/// A concurrent create that slips past the pre-check hits the unique index
/// on `title`; report that as the same conflict instead of a storage error.
fn conflict_for_constraint(constraint: Option<&str>) -> Option<juniper::FieldError> {
    match constraint {
        Some("challenges_title_key") => Some(challenge_exists_error()),
        _ => None,
    }
}

fn map_insert_error(err: diesel::result::Error) -> juniper::FieldError {
    if let diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::UniqueViolation,
        info,
    ) = &err
    {
        if let Some(conflict) = conflict_for_constraint(info.constraint_name()) {
            return conflict;
        }
    }
    err.into()
}

pub async fn create_challenge(
    ctx: &Context,
    title: String,
    points: i32,
) -> FieldResult<Challenge> {
    ctx.require_role_exact(UserRole::Admin)?;

    if title.trim().is_empty() {
        return Err(juniper::FieldError::new(
            "Challenge title cannot be blank",
            graphql_value!({"code": "INVALID_CHALLENGE_TITLE"}),
        ));
    }

    use crate::db::schema::challenges;
    let title_taken: bool = diesel::select(diesel::dsl::exists(
        challenges::table.filter(challenges::title.eq(&title)),
    ))
    .get_result(&mut ctx.get_db_conn().await)
    .await?;
    if title_taken {
        return Err(challenge_exists_error());
    }

    let challenge = diesel::insert_into(crate::db::schema::challenges::table)
        .values(NewChallenge { title, points })
        .returning(Challenge::as_returning())
        .get_result::<Challenge>(&mut ctx.get_db_conn().await)
        .await
        .map_err(map_insert_error)?;

    tracing::info!(challenge = %challenge.title, points = challenge.points, "challenge created");
    Ok(challenge)
}

pub async fn get_challenge(ctx: &Context, challenge_id: Uuid) -> FieldResult<Challenge> {
    ctx.require_authentication()?;

    use crate::db::schema::challenges::dsl::*;
    challenges
        .filter(id.eq(challenge_id))
        .select(Challenge::as_select())
        .first::<Challenge>(&mut ctx.get_db_conn().await)
        .await
        .optional()?
        .ok_or_else(|| {
            juniper::FieldError::new(
                "Challenge not found",
                graphql_value!({"code": "CHALLENGE_NOT_FOUND"}),
            )
        })
}

pub async fn get_challenges(ctx: &Context) -> FieldResult<Vec<Challenge>> {
    ctx.require_authentication()?;

    use crate::db::schema::challenges::dsl::*;
    Ok(challenges
        .order(created_at.asc())
        .select(Challenge::as_select())
        .load::<Challenge>(&mut ctx.get_db_conn().await)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_title_race_maps_to_the_conflict() {
        let conflict = conflict_for_constraint(Some("challenges_title_key"))
            .expect("title constraint must map to a conflict");
        assert_eq!(
            conflict.message(),
            "A challenge with this title already exists"
        );
    }

    #[test]
    fn other_constraints_pass_through() {
        assert!(conflict_for_constraint(Some("users_email_key")).is_none());
        assert!(conflict_for_constraint(None).is_none());
    }
}
