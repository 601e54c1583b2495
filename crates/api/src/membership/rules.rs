// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pure precondition checks for every membership transition.
//!
//! The engine in the parent module fetches the current rows inside a
//! transaction and runs these checks before writing anything. Keeping them
//! free of I/O means every rule can be exercised directly in tests.

use uuid::Uuid;

use crate::db::models::{CandidacyStatus, Team, TeamCandidacy};

use super::MembershipError;

pub fn check_team_name(name: &str) -> Result<(), MembershipError> {
    if name.trim().is_empty() {
        return Err(MembershipError::InvalidTeamName);
    }
    Ok(())
}

pub fn check_create_team(
    name_taken: bool,
    founder_membership: Option<&TeamCandidacy>,
) -> Result<(), MembershipError> {
    if name_taken {
        return Err(MembershipError::TeamNameExists);
    }
    if founder_membership.is_some() {
        return Err(MembershipError::AlreadyInTeam);
    }
    Ok(())
}

pub fn check_join_request(
    team: &Team,
    participant_id: Uuid,
    current_membership: Option<&TeamCandidacy>,
    has_pending: bool,
) -> Result<(), MembershipError> {
    if team.leader_id == participant_id {
        return Err(MembershipError::CannotJoinOwnTeam);
    }
    if current_membership.is_some() {
        return Err(MembershipError::AlreadyInTeam);
    }
    if has_pending {
        return Err(MembershipError::PendingCandidacyExists);
    }
    Ok(())
}

/// A candidacy can only be decided while it is still PENDING; terminal and
/// ACCEPTED candidacies reject any further decision.
pub fn check_candidacy_open(candidacy: &TeamCandidacy) -> Result<(), MembershipError> {
    if candidacy.status != CandidacyStatus::Pending {
        return Err(MembershipError::CandidacyAlreadyDecided);
    }
    Ok(())
}

/// Authorization is checked against the team's *current* leader, so a
/// leadership transfer between request and decision is honored.
pub fn check_is_leader(team: &Team, actor_id: Uuid) -> Result<(), MembershipError> {
    if team.leader_id != actor_id {
        return Err(MembershipError::NotLeader);
    }
    Ok(())
}

pub fn check_leave<'a>(
    team: &Team,
    participant_id: Uuid,
    membership: Option<&'a TeamCandidacy>,
) -> Result<&'a TeamCandidacy, MembershipError> {
    let membership = membership.ok_or(MembershipError::NotInTeam)?;
    if team.leader_id == participant_id {
        return Err(MembershipError::LeaderCannotLeave);
    }
    Ok(membership)
}

pub fn check_kick<'a>(
    team: &Team,
    target_id: Uuid,
    actor_id: Uuid,
    membership: Option<&'a TeamCandidacy>,
) -> Result<&'a TeamCandidacy, MembershipError> {
    let membership = membership.ok_or(MembershipError::NotInTeam)?;
    check_is_leader(team, actor_id)?;
    if team.leader_id == target_id {
        return Err(MembershipError::LeaderCannotBeKicked);
    }
    Ok(membership)
}

pub fn check_transfer(
    team: &Team,
    actor_id: Uuid,
    new_leader_id: Uuid,
    new_leader_membership: Option<&TeamCandidacy>,
) -> Result<(), MembershipError> {
    check_is_leader(team, actor_id)?;
    if actor_id == new_leader_id {
        return Err(MembershipError::SameLeader);
    }
    if new_leader_membership.is_none() {
        return Err(MembershipError::NotInTeam);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team(leader_id: Uuid) -> Team {
        Team {
            id: Uuid::now_v7(),
            name: "Alpha".to_string(),
            logo_url: None,
            leader_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn candidacy(team_id: Uuid, participant_id: Uuid, status: CandidacyStatus) -> TeamCandidacy {
        TeamCandidacy {
            id: Uuid::now_v7(),
            team_id,
            participant_id,
            status,
            created_at: Utc::now(),
            decided_at: None,
            ended_at: None,
            decided_by: None,
            ended_by: None,
        }
    }

    #[test]
    fn blank_team_name_is_rejected() {
        assert!(matches!(
            check_team_name("   "),
            Err(MembershipError::InvalidTeamName)
        ));
        assert!(check_team_name("Alpha").is_ok());
    }

    #[test]
    fn create_team_rejects_taken_name_and_existing_membership() {
        let founder = Uuid::now_v7();
        let elsewhere = candidacy(Uuid::now_v7(), founder, CandidacyStatus::Accepted);

        assert!(matches!(
            check_create_team(true, None),
            Err(MembershipError::TeamNameExists)
        ));
        assert!(matches!(
            check_create_team(false, Some(&elsewhere)),
            Err(MembershipError::AlreadyInTeam)
        ));
        assert!(check_create_team(false, None).is_ok());
    }

    #[test]
    fn leader_cannot_request_to_join_own_team() {
        let leader = Uuid::now_v7();
        let team = team(leader);
        assert!(matches!(
            check_join_request(&team, leader, None, false),
            Err(MembershipError::CannotJoinOwnTeam)
        ));
    }

    #[test]
    fn duplicate_pending_request_is_a_conflict() {
        let team = team(Uuid::now_v7());
        let requester = Uuid::now_v7();
        assert!(check_join_request(&team, requester, None, false).is_ok());
        assert!(matches!(
            check_join_request(&team, requester, None, true),
            Err(MembershipError::PendingCandidacyExists)
        ));
    }

    #[test]
    fn accepted_member_cannot_request_elsewhere() {
        let team = team(Uuid::now_v7());
        let requester = Uuid::now_v7();
        let membership = candidacy(Uuid::now_v7(), requester, CandidacyStatus::Accepted);
        assert!(matches!(
            check_join_request(&team, requester, Some(&membership), false),
            Err(MembershipError::AlreadyInTeam)
        ));
    }

    #[test]
    fn decided_candidacies_are_terminal() {
        let team_id = Uuid::now_v7();
        let participant = Uuid::now_v7();
        for status in [
            CandidacyStatus::Accepted,
            CandidacyStatus::Refused,
            CandidacyStatus::Left,
            CandidacyStatus::Kicked,
        ] {
            let c = candidacy(team_id, participant, status);
            assert!(matches!(
                check_candidacy_open(&c),
                Err(MembershipError::CandidacyAlreadyDecided)
            ));
        }
        let open = candidacy(team_id, participant, CandidacyStatus::Pending);
        assert!(check_candidacy_open(&open).is_ok());
    }

    #[test]
    fn only_the_current_leader_may_decide() {
        let leader = Uuid::now_v7();
        let team = team(leader);
        assert!(check_is_leader(&team, leader).is_ok());
        assert!(matches!(
            check_is_leader(&team, Uuid::now_v7()),
            Err(MembershipError::NotLeader)
        ));
    }

    #[test]
    fn leader_cannot_leave_without_transferring() {
        let leader = Uuid::now_v7();
        let team = team(leader);
        let membership = candidacy(team.id, leader, CandidacyStatus::Accepted);
        assert!(matches!(
            check_leave(&team, leader, Some(&membership)),
            Err(MembershipError::LeaderCannotLeave)
        ));
    }

    #[test]
    fn former_leader_may_leave_after_transfer() {
        let old_leader = Uuid::now_v7();
        let new_leader = Uuid::now_v7();
        let mut team = team(old_leader);
        let membership = candidacy(team.id, old_leader, CandidacyStatus::Accepted);

        // While leader: blocked.
        assert!(matches!(
            check_leave(&team, old_leader, Some(&membership)),
            Err(MembershipError::LeaderCannotLeave)
        ));

        team.leader_id = new_leader;
        assert!(check_leave(&team, old_leader, Some(&membership)).is_ok());
    }

    #[test]
    fn leaving_without_membership_is_a_conflict() {
        let team = team(Uuid::now_v7());
        assert!(matches!(
            check_leave(&team, Uuid::now_v7(), None),
            Err(MembershipError::NotInTeam)
        ));
    }

    #[test]
    fn only_the_leader_may_kick() {
        let leader = Uuid::now_v7();
        let member = Uuid::now_v7();
        let bystander = Uuid::now_v7();
        let team = team(leader);
        let membership = candidacy(team.id, member, CandidacyStatus::Accepted);

        assert!(matches!(
            check_kick(&team, member, bystander, Some(&membership)),
            Err(MembershipError::NotLeader)
        ));
        assert!(check_kick(&team, member, leader, Some(&membership)).is_ok());
    }

    #[test]
    fn leader_cannot_be_kicked() {
        let leader = Uuid::now_v7();
        let team = team(leader);
        let membership = candidacy(team.id, leader, CandidacyStatus::Accepted);
        assert!(matches!(
            check_kick(&team, leader, leader, Some(&membership)),
            Err(MembershipError::LeaderCannotBeKicked)
        ));
    }

    #[test]
    fn transfer_requires_distinct_accepted_member() {
        let leader = Uuid::now_v7();
        let member = Uuid::now_v7();
        let team = team(leader);
        let membership = candidacy(team.id, member, CandidacyStatus::Accepted);

        assert!(matches!(
            check_transfer(&team, member, leader, Some(&membership)),
            Err(MembershipError::NotLeader)
        ));
        assert!(matches!(
            check_transfer(&team, leader, leader, Some(&membership)),
            Err(MembershipError::SameLeader)
        ));
        assert!(matches!(
            check_transfer(&team, leader, member, None),
            Err(MembershipError::NotInTeam)
        ));
        assert!(check_transfer(&team, leader, member, Some(&membership)).is_ok());
    }
}
