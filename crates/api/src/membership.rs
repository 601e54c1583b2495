// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The team membership and candidacy lifecycle engine.
//!
//! Every mutating operation runs as one database transaction: the actor and
//! subject rows are fetched, the preconditions in [`rules`] are checked, and
//! the transition is written. Races that slip past the in-transaction checks
//! (two identical join requests, two accepts for the same participant on
//! different teams) are stopped by partial unique indexes and surface here
//! as the matching conflict error instead of a storage error.
//!
//! The acting identity is always an explicit parameter; the engine never
//! reads ambient request state.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{
    CandidacyStatus, NewTeam, NewTeamCandidacy, Team, TeamCandidacy, User, UserRole,
};

pub mod rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION",
            Self::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Participant not found")]
    ParticipantNotFound,
    #[error("Team not found")]
    TeamNotFound,
    #[error("Candidacy not found")]
    CandidacyNotFound,
    #[error("Team name cannot be blank")]
    InvalidTeamName,
    #[error("A team with this name already exists")]
    TeamNameExists,
    #[error("Participant is already a member of a team")]
    AlreadyInTeam,
    #[error("The team leader cannot request to join their own team")]
    CannotJoinOwnTeam,
    #[error("A pending candidacy already exists for this participant and team")]
    PendingCandidacyExists,
    #[error("The candidacy has already been decided")]
    CandidacyAlreadyDecided,
    #[error("Participant is not a member of this team")]
    NotInTeam,
    #[error("Only the team leader may perform this action")]
    NotLeader,
    #[error("The team leader cannot leave the team without transferring leadership first")]
    LeaderCannotLeave,
    #[error("The team leader cannot be kicked")]
    LeaderCannotBeKicked,
    #[error("The new leader must be different from the current leader")]
    SameLeader,
    #[error("Database error: {0}")]
    Database(diesel::result::Error),
}

impl MembershipError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            Self::TeamNotFound => "TEAM_NOT_FOUND",
            Self::CandidacyNotFound => "CANDIDACY_NOT_FOUND",
            Self::InvalidTeamName => "INVALID_TEAM_NAME",
            Self::TeamNameExists => "TEAM_NAME_ALREADY_EXISTS",
            Self::AlreadyInTeam => "ALREADY_IN_TEAM",
            Self::CannotJoinOwnTeam => "CANNOT_JOIN_OWN_TEAM",
            Self::PendingCandidacyExists => "PENDING_CANDIDACY_EXISTS",
            Self::CandidacyAlreadyDecided => "CANDIDACY_ALREADY_DECIDED",
            Self::NotInTeam => "NOT_IN_TEAM",
            Self::NotLeader => "FORBIDDEN",
            Self::LeaderCannotLeave => "LEADER_CANNOT_LEAVE",
            Self::LeaderCannotBeKicked => "LEADER_CANNOT_BE_KICKED",
            Self::SameLeader => "SAME_LEADER",
            Self::Database(_) => "INTERNAL",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParticipantNotFound | Self::TeamNotFound | Self::CandidacyNotFound => {
                ErrorKind::NotFound
            }
            Self::InvalidTeamName => ErrorKind::Validation,
            Self::NotLeader => ErrorKind::Forbidden,
            Self::Database(_) => ErrorKind::Internal,
            _ => ErrorKind::Conflict,
        }
    }
}

/// Maps a unique-constraint violation raised by a concurrent request to the
/// conflict the loser of the race would have gotten from the precondition
/// checks.
fn conflict_for_constraint(constraint: Option<&str>) -> Option<MembershipError> {
    match constraint {
        Some("one_accepted_candidacy_per_participant") => Some(MembershipError::AlreadyInTeam),
        Some("one_pending_candidacy_per_team") => Some(MembershipError::PendingCandidacyExists),
        Some("teams_name_key") => Some(MembershipError::TeamNameExists),
        _ => None,
    }
}

impl From<diesel::result::Error> for MembershipError {
    fn from(err: diesel::result::Error) -> Self {
        if let diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            info,
        ) = &err
        {
            if let Some(conflict) = conflict_for_constraint(info.constraint_name()) {
                return conflict;
            }
        }
        Self::Database(err)
    }
}

async fn find_participant(
    conn: &mut AsyncPgConnection,
    participant: Uuid,
) -> Result<User, MembershipError> {
    use crate::db::schema::users::dsl::*;
    users
        .filter(id.eq(participant))
        .filter(role.eq(UserRole::Participant))
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?
        .ok_or(MembershipError::ParticipantNotFound)
}

async fn find_team(conn: &mut AsyncPgConnection, team: Uuid) -> Result<Team, MembershipError> {
    use crate::db::schema::teams::dsl::*;
    teams
        .filter(id.eq(team))
        .select(Team::as_select())
        .first::<Team>(conn)
        .await
        .optional()?
        .ok_or(MembershipError::TeamNotFound)
}

/// Invariant: at most one row can match (enforced by
/// `one_accepted_candidacy_per_participant`).
async fn accepted_candidacy_anywhere(
    conn: &mut AsyncPgConnection,
    participant: Uuid,
) -> Result<Option<TeamCandidacy>, MembershipError> {
    use crate::db::schema::team_candidacies::dsl::*;
    Ok(team_candidacies
        .filter(participant_id.eq(participant))
        .filter(status.eq(CandidacyStatus::Accepted))
        .select(TeamCandidacy::as_select())
        .first::<TeamCandidacy>(conn)
        .await
        .optional()?)
}

async fn accepted_candidacy(
    conn: &mut AsyncPgConnection,
    team: Uuid,
    participant: Uuid,
) -> Result<Option<TeamCandidacy>, MembershipError> {
    use crate::db::schema::team_candidacies::dsl::*;
    Ok(team_candidacies
        .filter(team_id.eq(team))
        .filter(participant_id.eq(participant))
        .filter(status.eq(CandidacyStatus::Accepted))
        .select(TeamCandidacy::as_select())
        .first::<TeamCandidacy>(conn)
        .await
        .optional()?)
}

async fn has_pending_candidacy(
    conn: &mut AsyncPgConnection,
    team: Uuid,
    participant: Uuid,
) -> Result<bool, MembershipError> {
    use crate::db::schema::team_candidacies::dsl::*;
    Ok(diesel::select(diesel::dsl::exists(
        team_candidacies
            .filter(team_id.eq(team))
            .filter(participant_id.eq(participant))
            .filter(status.eq(CandidacyStatus::Pending)),
    ))
    .get_result::<bool>(conn)
    .await?)
}

/// Creates a team and its founding leader candidacy atomically: the team
/// never exists without its leader holding an ACCEPTED candidacy.
pub async fn create_team(
    conn: &mut AsyncPgConnection,
    team_name: String,
    logo_url: Option<String>,
    founder_id: Uuid,
) -> Result<Team, MembershipError> {
    conn.transaction::<Team, MembershipError, _>(|conn| {
        async move {
            let founder = find_participant(conn, founder_id).await?;
            rules::check_team_name(&team_name)?;

            let name_taken = {
                use crate::db::schema::teams::dsl::*;
                diesel::select(diesel::dsl::exists(teams.filter(name.eq(&team_name))))
                    .get_result::<bool>(conn)
                    .await?
            };
            let founder_membership = accepted_candidacy_anywhere(conn, founder.id).await?;
            rules::check_create_team(name_taken, founder_membership.as_ref())?;

            let team = diesel::insert_into(crate::db::schema::teams::table)
                .values(NewTeam {
                    name: team_name,
                    logo_url,
                    leader_id: founder.id,
                })
                .returning(Team::as_returning())
                .get_result::<Team>(conn)
                .await?;

            // The founding candidacy is born ACCEPTED and self-decided.
            diesel::insert_into(crate::db::schema::team_candidacies::table)
                .values(NewTeamCandidacy {
                    team_id: team.id,
                    participant_id: founder.id,
                    status: CandidacyStatus::Accepted,
                    decided_at: Some(Utc::now()),
                    decided_by: Some(founder.id),
                })
                .execute(conn)
                .await?;

            Ok(team)
        }
        .scope_boxed()
    })
    .await
}

pub async fn request_to_join(
    conn: &mut AsyncPgConnection,
    team_id: Uuid,
    requester_id: Uuid,
) -> Result<TeamCandidacy, MembershipError> {
    conn.transaction::<TeamCandidacy, MembershipError, _>(|conn| {
        async move {
            let participant = find_participant(conn, requester_id).await?;
            let team = find_team(conn, team_id).await?;

            let current_membership = accepted_candidacy_anywhere(conn, participant.id).await?;
            let pending = has_pending_candidacy(conn, team.id, participant.id).await?;
            rules::check_join_request(&team, participant.id, current_membership.as_ref(), pending)?;

            let candidacy = diesel::insert_into(crate::db::schema::team_candidacies::table)
                .values(NewTeamCandidacy {
                    team_id: team.id,
                    participant_id: participant.id,
                    status: CandidacyStatus::Pending,
                    decided_at: None,
                    decided_by: None,
                })
                .returning(TeamCandidacy::as_returning())
                .get_result::<TeamCandidacy>(conn)
                .await?;

            Ok(candidacy)
        }
        .scope_boxed()
    })
    .await
}

/// Accepts or refuses a pending candidacy. The leader check runs against the
/// team's current state, so a leadership transfer that happened after the
/// request was filed is honored. A re-decision is rejected, never silently
/// ignored.
pub async fn respond_to_candidacy(
    conn: &mut AsyncPgConnection,
    candidacy_id: Uuid,
    accept: bool,
    decider_id: Uuid,
) -> Result<TeamCandidacy, MembershipError> {
    conn.transaction::<TeamCandidacy, MembershipError, _>(|conn| {
        async move {
            let candidacy = {
                use crate::db::schema::team_candidacies::dsl::*;
                team_candidacies
                    .filter(id.eq(candidacy_id))
                    .select(TeamCandidacy::as_select())
                    .first::<TeamCandidacy>(conn)
                    .await
                    .optional()?
                    .ok_or(MembershipError::CandidacyNotFound)?
            };
            rules::check_candidacy_open(&candidacy)?;

            let decider = find_participant(conn, decider_id).await?;
            let team = find_team(conn, candidacy.team_id).await?;
            rules::check_is_leader(&team, decider.id)?;

            let new_status = if accept {
                CandidacyStatus::Accepted
            } else {
                CandidacyStatus::Refused
            };

            // If the participant got accepted on another team in the
            // meantime, the accepted-candidacy index turns this update into
            // an ALREADY_IN_TEAM conflict.
            let updated = {
                use crate::db::schema::team_candidacies::dsl::*;
                diesel::update(team_candidacies.filter(id.eq(candidacy.id)))
                    .set((
                        status.eq(new_status),
                        decided_by.eq(Some(decider.id)),
                        decided_at.eq(Some(Utc::now())),
                    ))
                    .returning(TeamCandidacy::as_returning())
                    .get_result::<TeamCandidacy>(conn)
                    .await?
            };

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

pub async fn leave_team(
    conn: &mut AsyncPgConnection,
    team_id: Uuid,
    participant_id: Uuid,
) -> Result<TeamCandidacy, MembershipError> {
    conn.transaction::<TeamCandidacy, MembershipError, _>(|conn| {
        async move {
            let participant = find_participant(conn, participant_id).await?;
            let team = find_team(conn, team_id).await?;

            let membership = accepted_candidacy(conn, team.id, participant.id).await?;
            let membership = rules::check_leave(&team, participant.id, membership.as_ref())?;

            let updated = {
                use crate::db::schema::team_candidacies::dsl::*;
                diesel::update(team_candidacies.filter(id.eq(membership.id)))
                    .set((
                        status.eq(CandidacyStatus::Left),
                        ended_at.eq(Some(Utc::now())),
                    ))
                    .returning(TeamCandidacy::as_returning())
                    .get_result::<TeamCandidacy>(conn)
                    .await?
            };

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

pub async fn kick_member(
    conn: &mut AsyncPgConnection,
    team_id: Uuid,
    target_id: Uuid,
    actor_id: Uuid,
) -> Result<TeamCandidacy, MembershipError> {
    conn.transaction::<TeamCandidacy, MembershipError, _>(|conn| {
        async move {
            let target = find_participant(conn, target_id).await?;
            let team = find_team(conn, team_id).await?;

            let membership = accepted_candidacy(conn, team.id, target.id).await?;
            let membership = rules::check_kick(&team, target.id, actor_id, membership.as_ref())?;

            let updated = {
                use crate::db::schema::team_candidacies::dsl::*;
                diesel::update(team_candidacies.filter(id.eq(membership.id)))
                    .set((
                        status.eq(CandidacyStatus::Kicked),
                        ended_at.eq(Some(Utc::now())),
                        ended_by.eq(Some(actor_id)),
                    ))
                    .returning(TeamCandidacy::as_returning())
                    .get_result::<TeamCandidacy>(conn)
                    .await?
            };

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

/// The old leader's candidacy stays ACCEPTED and becomes an ordinary
/// membership; they may leave afterwards.
pub async fn transfer_leadership(
    conn: &mut AsyncPgConnection,
    team_id: Uuid,
    actor_id: Uuid,
    new_leader_id: Uuid,
) -> Result<Team, MembershipError> {
    conn.transaction::<Team, MembershipError, _>(|conn| {
        async move {
            let team = find_team(conn, team_id).await?;
            rules::check_is_leader(&team, actor_id)?;
            if actor_id == new_leader_id {
                return Err(MembershipError::SameLeader);
            }

            let new_leader = find_participant(conn, new_leader_id).await?;
            let membership = accepted_candidacy(conn, team.id, new_leader.id).await?;
            rules::check_transfer(&team, actor_id, new_leader.id, membership.as_ref())?;

            let updated = {
                use crate::db::schema::teams::dsl::*;
                diesel::update(teams.filter(id.eq(team.id)))
                    .set(leader_id.eq(new_leader.id))
                    .returning(Team::as_returning())
                    .get_result::<Team>(conn)
                    .await?
            };

            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

/// Active roster of a team; public-readable.
pub async fn team_roster(
    conn: &mut AsyncPgConnection,
    team: Uuid,
) -> Result<Vec<User>, MembershipError> {
    let team = find_team(conn, team).await?;
    use crate::db::schema::{team_candidacies, users};
    Ok(team_candidacies::table
        .inner_join(users::table)
        .filter(team_candidacies::team_id.eq(team.id))
        .filter(team_candidacies::status.eq(CandidacyStatus::Accepted))
        .order(team_candidacies::created_at.asc())
        .select(User::as_select())
        .load::<User>(conn)
        .await?)
}

/// Counted live on every call; list views must never see a stale count.
pub async fn active_member_count(
    conn: &mut AsyncPgConnection,
    team: Uuid,
) -> Result<i64, MembershipError> {
    use crate::db::schema::team_candidacies::dsl::*;
    Ok(team_candidacies
        .filter(team_id.eq(team))
        .filter(status.eq(CandidacyStatus::Accepted))
        .count()
        .get_result::<i64>(conn)
        .await?)
}

/// Status-filtered candidacy listing with full audit fields; restricted to
/// the team leader or an administrator.
pub async fn list_candidacies(
    conn: &mut AsyncPgConnection,
    team: Uuid,
    status_filter: CandidacyStatus,
    requester_id: Uuid,
    is_admin: bool,
) -> Result<Vec<TeamCandidacy>, MembershipError> {
    let team = find_team(conn, team).await?;
    if !is_admin {
        rules::check_is_leader(&team, requester_id)?;
    }

    use crate::db::schema::team_candidacies::dsl::*;
    Ok(team_candidacies
        .filter(team_id.eq(team.id))
        .filter(status.eq(status_filter))
        .order(created_at.asc())
        .select(TeamCandidacy::as_select())
        .load::<TeamCandidacy>(conn)
        .await?)
}

/// The team a participant currently belongs to, if any.
pub async fn current_team(
    conn: &mut AsyncPgConnection,
    participant: Uuid,
) -> Result<Option<Team>, MembershipError> {
    let Some(candidacy) = accepted_candidacy_anywhere(conn, participant).await? else {
        return Ok(None);
    };
    use crate::db::schema::teams::dsl::*;
    Ok(teams
        .filter(id.eq(candidacy.team_id))
        .select(Team::as_select())
        .first::<Team>(conn)
        .await
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_constraint_violations_map_to_conflicts() {
        assert!(matches!(
            conflict_for_constraint(Some("one_accepted_candidacy_per_participant")),
            Some(MembershipError::AlreadyInTeam)
        ));
        assert!(matches!(
            conflict_for_constraint(Some("one_pending_candidacy_per_team")),
            Some(MembershipError::PendingCandidacyExists)
        ));
        assert!(matches!(
            conflict_for_constraint(Some("teams_name_key")),
            Some(MembershipError::TeamNameExists)
        ));
        assert!(conflict_for_constraint(Some("sessions_session_token_key")).is_none());
        assert!(conflict_for_constraint(None).is_none());
    }

    #[test]
    fn error_kinds_follow_the_taxonomy() {
        assert_eq!(MembershipError::TeamNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(MembershipError::InvalidTeamName.kind(), ErrorKind::Validation);
        assert_eq!(MembershipError::NotLeader.kind(), ErrorKind::Forbidden);
        assert_eq!(MembershipError::AlreadyInTeam.kind(), ErrorKind::Conflict);
        assert_eq!(MembershipError::LeaderCannotLeave.kind(), ErrorKind::Conflict);
        assert_eq!(
            MembershipError::Database(diesel::result::Error::RollbackTransaction).kind(),
            ErrorKind::Internal
        );
    }
}
