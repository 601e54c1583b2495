// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use diesel::associations::Identifiable;
use diesel::prelude::*;
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::*;

/// Closed role set; a single identity record carries the role tag plus the
/// role-specific optional fields (`organization`, `score`).
#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::UserRole"]
pub enum UserRole {
    Participant,
    Organizer,
    Admin,
}

/// One row per participant-team relationship attempt.
///
/// PENDING -> {ACCEPTED -> {LEFT, KICKED}} | REFUSED; the three rightmost
/// states are terminal.
#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::CandidacyStatus"]
pub enum CandidacyStatus {
    Pending,
    Accepted,
    Refused,
    Left,
    Kicked,
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::CtfStatus"]
pub enum CtfStatus {
    Pending,
    Active,
    Inactive,
}

/* =========================
 * USERS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub email: String,
    pub role: UserRole,
    pub organization: Option<String>,
    pub score: i32,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub email: String,
    pub role: UserRole,
    pub organization: Option<String>,
}

/* =========================
 * SESSIONS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = sessions)]
#[diesel(belongs_to(User))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<ipnet::IpNet>,
    pub session_token: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<ipnet::IpNet>,
    pub session_token: String,
}

/* =========================
 * TEAMS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub leader_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
    pub logo_url: Option<String>,
    pub leader_id: Uuid,
}

/* =========================
 * TEAM CANDIDACIES
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(table_name = team_candidacies)]
#[diesel(belongs_to(Team))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamCandidacy {
    pub id: Uuid,
    pub team_id: Uuid,
    pub participant_id: Uuid,
    pub status: CandidacyStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Uuid>,
    pub ended_by: Option<Uuid>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = team_candidacies)]
pub struct NewTeamCandidacy {
    pub team_id: Uuid,
    pub participant_id: Uuid,
    pub status: CandidacyStatus,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Uuid>,
}

/* =========================
 * CTFS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = ctfs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ctf {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub views: i32,
    pub status: CtfStatus,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = ctfs)]
pub struct NewCtf {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: CtfStatus,
    pub organizer_id: Uuid,
}

/* =========================
 * CHALLENGES
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = challenges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = challenges)]
pub struct NewChallenge {
    pub title: String,
    pub points: i32,
}

/* =========================
 * CTF COMMENTS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = ctf_comments)]
#[diesel(belongs_to(Ctf))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CtfComment {
    pub id: Uuid,
    pub ctf_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = ctf_comments)]
pub struct NewCtfComment {
    pub ctf_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
}
