// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, IntoFieldError, graphql_object};

use crate::db::models::{Team, User, UserRole};
use crate::graphql::Context;
use crate::membership;

#[graphql_object]
impl User {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self, ctx: &Context) -> FieldResult<String> {
        if ctx
            .user
            .as_ref()
            .is_some_and(|u| u.user_id == self.id || u.role == UserRole::Admin)
        {
            Ok(self.email.clone())
        } else {
            Err(juniper::FieldError::new(
                "Permission denied to view email",
                juniper::Value::null(),
            ))
        }
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    pub fn banned(&self, ctx: &Context) -> FieldResult<bool> {
        if ctx.user.as_ref().is_some_and(|u| u.role == UserRole::Admin) {
            Ok(self.banned)
        } else {
            Err(juniper::FieldError::new(
                "Permission denied to view ban state",
                juniper::Value::null(),
            ))
        }
    }

    pub fn ban_reason(&self, ctx: &Context) -> FieldResult<Option<String>> {
        if ctx.user.as_ref().is_some_and(|u| u.role == UserRole::Admin) {
            Ok(self.ban_reason.clone())
        } else {
            Err(juniper::FieldError::new(
                "Permission denied to view ban state",
                juniper::Value::null(),
            ))
        }
    }

    /// The team this participant currently belongs to, resolved through the
    /// accepted candidacy so it is never stale.
    pub async fn team(&self, ctx: &Context) -> FieldResult<Option<Team>> {
        Ok(membership::current_team(&mut *ctx.get_db_conn().await, self.id)
            .await
            .map_err(IntoFieldError::into_field_error)?)
    }
}
