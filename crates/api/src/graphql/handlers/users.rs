// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::{
    db::{
        models::{NewUser, User, UserRole},
        schema::users,
    },
    graphql::{Context, handlers::sessions::SessionCredentials},
};
use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString},
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use juniper::{FieldResult, graphql_value};
use rand_core::OsRng;
use uuid::Uuid;

pub mod details;

async fn register(
    context: &Context,
    username: String,
    email: String,
    password: String,
    role: UserRole,
    organization: Option<String>,
) -> FieldResult<bool> {
    let email_taken: bool = diesel::select(diesel::dsl::exists(
        users::table.filter(users::email.eq(&email)),
    ))
    .get_result(&mut context.get_db_conn().await)
    .await?;
    if email_taken {
        return Err(juniper::FieldError::new(
            "Email is already in use",
            graphql_value!({"code": "EMAIL_ALREADY_USED"}),
        ));
    }

    let username_taken: bool = diesel::select(diesel::dsl::exists(
        users::table.filter(users::username.eq(&username)),
    ))
    .get_result(&mut context.get_db_conn().await)
    .await?;
    if username_taken {
        return Err(juniper::FieldError::new(
            "Username is already in use",
            graphql_value!({"code": "USERNAME_ALREADY_USED"}),
        ));
    }

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let new_user = NewUser {
        username: username.clone(),
        display_name: username,
        password_hash: argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string(),
        email,
        role,
        organization,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(&mut context.get_db_conn().await)
        .await?;

    Ok(true)
}

pub async fn create_user(
    username: String,
    email: String,
    password: String,
    context: &Context,
) -> FieldResult<bool> {
    let mut role = UserRole::Participant;
    let user_count = users::table
        .count()
        .get_result::<i64>(&mut context.get_db_conn().await)
        .await?;
    // The very first account bootstraps the instance.
    if user_count == 0 {
        role = UserRole::Admin;
    }

    register(context, username, email, password, role, None).await
}

pub async fn create_organizer(
    username: String,
    email: String,
    password: String,
    organization: String,
    context: &Context,
) -> FieldResult<bool> {
    register(
        context,
        username,
        email,
        password,
        UserRole::Organizer,
        Some(organization),
    )
    .await
}

pub async fn create_admin(
    username: String,
    email: String,
    password: String,
    context: &Context,
) -> FieldResult<bool> {
    context.require_role_exact(UserRole::Admin)?;
    register(context, username, email, password, UserRole::Admin, None).await
}

pub async fn login_user(
    email: String,
    password: String,
    context: &Context,
) -> FieldResult<SessionCredentials> {
    let user = users::table
        .filter(users::email.eq(&email))
        .select(User::as_select())
        .first(&mut context.get_db_conn().await)
        .await
        .optional()?;
    match user {
        Some(user) => {
            let parsed_hash = argon2::PasswordHash::new(&user.password_hash)?;
            if Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_err()
            {
                // Deliberately identical to the unknown-email answer.
                return Err(juniper::FieldError::new(
                    "Invalid email or password",
                    graphql_value!({"code": "AUTHENTICATION_FAILED"}),
                ));
            }
            if user.banned {
                return Err(juniper::FieldError::new(
                    "User is banned",
                    graphql_value!({"code": "USER_BANNED"}),
                ));
            }
            let signing_key = context.get_signing_key();
            let session_credentials = crate::graphql::handlers::sessions::create_session(
                context,
                user.id,
                user.role,
                user.username,
                signing_key,
            )
            .await?;
            Ok(session_credentials)
        }
        None => Err(juniper::FieldError::new(
            "Invalid email or password",
            graphql_value!({"code": "AUTHENTICATION_FAILED"}),
        )),
    }
}

pub async fn ban_user(
    context: &Context,
    user_id: Uuid,
    reason: Option<String>,
) -> FieldResult<bool> {
    context.require_role_exact(UserRole::Admin)?;

    let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::banned.eq(true),
            users::ban_reason.eq(reason),
            users::banned_at.eq(Some(chrono::Utc::now())),
        ))
        .execute(&mut context.get_db_conn().await)
        .await?;

    if updated == 0 {
        return Err(juniper::FieldError::new(
            "User not found",
            graphql_value!({"code": "USER_NOT_FOUND"}),
        ));
    }
    Ok(true)
}

pub async fn get_all_users(context: &Context) -> FieldResult<Vec<User>> {
    context.require_role_exact(UserRole::Admin)?;
    let records = users::table
        .select(User::as_select())
        .load::<User>(&mut context.get_db_conn().await)
        .await?;
    Ok(records)
}

pub async fn get_participants(context: &Context) -> FieldResult<Vec<User>> {
    let records = users::table
        .filter(users::role.eq(UserRole::Participant))
        .select(User::as_select())
        .load::<User>(&mut context.get_db_conn().await)
        .await?;
    Ok(records)
}

pub async fn get_organizers(context: &Context) -> FieldResult<Vec<User>> {
    let records = users::table
        .filter(users::role.eq(UserRole::Organizer))
        .select(User::as_select())
        .load::<User>(&mut context.get_db_conn().await)
        .await?;
    Ok(records)
}

pub async fn get_current_user(context: &Context) -> FieldResult<Option<User>> {
    let Some(current_user) = &context.user else {
        return Ok(None);
    };
    get_user_by_id(current_user.user_id, context).await
}

pub async fn get_user_by_id(user_id: Uuid, context: &Context) -> FieldResult<Option<User>> {
    let record = users::table
        .filter(users::id.eq(user_id))
        .select(User::as_select())
        .first::<User>(&mut context.get_db_conn().await)
        .await
        .optional()?;
    Ok(record)
}
