//! Guest grouping
//!
//! Groups are a re-syncable projection of the roster: accommodation groups
//! by declared tag, location groups by departure location. Synchronization
//! only re-places members it placed itself (`MemberSource::Derived`); staff
//! placements and staff-corrected origin codes survive every run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AirportCode, Configuration, Group, GroupMetadata, GroupOrigin, GroupingKind, Guest, LocationGroup, MemberRef,
    MemberSource, Membership,
};
use crate::services::collaborators::GuestRoster;
use crate::services::configuration::ConfigurationService;
use crate::state::SyncTicket;
use crate::utils::errors::{LogisticsError, Result};
use crate::utils::helpers::{group_key, is_valid_email, normalize_email, normalize_group_name, normalize_labels};
use crate::utils::logging::{log_guest_move, log_sync_report, log_upstream_error};

/// Longest accepted group name
pub const MAX_GROUP_NAME_LEN: usize = 100;

/// A group synchronization could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFailure {
    pub kind: GroupingKind,
    pub group: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub event_id: Uuid,
    pub groups_processed: usize,
    pub failed_groups: Vec<GroupFailure>,
    /// False when the run found nothing to change and saved nothing
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub configuration: Configuration,
    pub report: SyncReport,
}

/// Guests sharing one grouping key, in roster order
#[derive(Debug)]
struct Partition {
    name: String,
    members: Vec<String>,
}

/// Group guests by `key_of`, keeping first-seen order of keys and guests
fn partition_by<F>(guests: &[&Guest], key_of: F) -> (Vec<Partition>, HashMap<String, String>)
where
    F: Fn(&Guest) -> Option<&str>,
{
    let mut partitions: Vec<Partition> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut assignment: HashMap<String, String> = HashMap::new();

    for guest in guests {
        let Some(raw) = key_of(guest) else { continue };
        let name = normalize_group_name(raw);
        let key = group_key(&name);
        let email = guest.key();

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            partitions.push(Partition {
                name: name.clone(),
                members: Vec::new(),
            });
            partitions.len() - 1
        });
        partitions[slot].members.push(email.clone());
        assignment.insert(email, key);
    }

    (partitions, assignment)
}

/// Checked, normalized group name
pub fn validate_group_name(name: &str) -> Result<String> {
    let normalized = normalize_group_name(name);
    if normalized.is_empty() {
        return Err(LogisticsError::validation("group_name", "must not be empty"));
    }
    if normalized.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(LogisticsError::validation(
            "group_name",
            format!("must be at most {} characters", MAX_GROUP_NAME_LEN),
        ));
    }
    Ok(normalized)
}

fn position_of<G: Membership>(groups: &[G], name: &str) -> Option<usize> {
    let key = group_key(name);
    groups.iter().position(|g| group_key(g.name()) == key)
}

/// Bring one grouping kind in line with the roster
#[allow(clippy::too_many_arguments)]
fn reconcile<G, F>(
    kind: GroupingKind,
    groups: &mut Vec<G>,
    partitions: &[Partition],
    assignment: &HashMap<String, String>,
    on_roster: &HashSet<String>,
    create: F,
    ticket: &SyncTicket,
    failures: &mut Vec<GroupFailure>,
) -> Result<usize>
where
    G: Membership,
    F: Fn(&str) -> G,
{
    // Drop guests who left the roster, and derived members whose key moved elsewhere
    for group in groups.iter_mut() {
        let own_key = group_key(group.name());
        let before = group.members().len();
        group.members_mut().retain(|m| {
            on_roster.contains(&m.email)
                && match m.source {
                    MemberSource::Manual => true,
                    MemberSource::Derived => assignment.get(&m.email) == Some(&own_key),
                }
        });
        if group.members().len() != before {
            debug!(kind = %kind, group = %group.name(), removed = before - group.members().len(), "Stale members removed");
        }
        group.refresh_count();
    }

    let mut processed = 0;
    for partition in partitions {
        ticket.ensure_current()?;

        let name = match validate_group_name(&partition.name) {
            Ok(name) => name,
            Err(e) => {
                warn!(kind = %kind, group = %partition.name, error = %e, "Skipping group");
                failures.push(GroupFailure {
                    kind,
                    group: partition.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let slot = match position_of(groups, &name) {
            Some(slot) => slot,
            None => {
                debug!(kind = %kind, group = %name, "Creating group");
                groups.push(create(&name));
                groups.len() - 1
            }
        };

        for email in &partition.members {
            if groups.iter().any(|g| g.contains(email)) {
                continue;
            }
            groups[slot].push_member(MemberRef::derived(email));
        }
        processed += 1;
    }

    Ok(processed)
}

pub struct GroupingEngine {
    roster: Arc<dyn GuestRoster>,
    configurations: ConfigurationService,
}

impl GroupingEngine {
    pub fn new(roster: Arc<dyn GuestRoster>, configurations: ConfigurationService) -> Self {
        Self { roster, configurations }
    }

    async fn fetch_roster(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        self.roster.list_guests(event_id).await.map_err(|e| {
            log_upstream_error("guest_roster", &e.to_string(), Some(&event_id.to_string()));
            match e {
                LogisticsError::Roster(_) => e,
                other => LogisticsError::Roster(other.to_string()),
            }
        })
    }

    /// Re-derive both grouping kinds from the current roster.
    ///
    /// Saves only when something changed, so an unchanged roster leaves the
    /// stored document byte-identical. A newer call for the same event makes
    /// this one return `Superseded` before it writes anything.
    pub async fn synchronize(&self, event_id: Uuid) -> Result<SyncOutcome> {
        let ticket = self.configurations.begin_sync(event_id);
        let _guard = self.configurations.lock(event_id).await?;
        ticket.ensure_current()?;

        let guests = self.fetch_roster(event_id).await?;
        ticket.ensure_current()?;

        let mut configuration = self.configurations.load_or_new(event_id).await?;
        let before = configuration.clone();

        let mut seen = HashSet::new();
        let unique: Vec<&Guest> = guests
            .iter()
            .filter(|g| !g.email.trim().is_empty() && seen.insert(g.key()))
            .collect();
        let on_roster: HashSet<String> = unique.iter().map(|g| g.key()).collect();

        let mut failures = Vec::new();
        let window = configuration.search_window;

        let (tag_partitions, tag_assignment) = partition_by(&unique, |g| g.tag());
        let accommodation = reconcile(
            GroupingKind::Accommodation,
            &mut configuration.groups,
            &tag_partitions,
            &tag_assignment,
            &on_roster,
            |name| Group::new(name, 0, None, GroupOrigin::Auto),
            &ticket,
            &mut failures,
        )?;

        let (location_partitions, location_assignment) = partition_by(&unique, |g| g.departure());
        let location = reconcile(
            GroupingKind::Location,
            &mut configuration.location_groups,
            &location_partitions,
            &location_assignment,
            &on_roster,
            |name| LocationGroup::new(name, window),
            &ticket,
            &mut failures,
        )?;

        configuration.refresh_stats();
        let changed = configuration != before || configuration.version == 0;

        let configuration = if changed {
            ticket.ensure_current()?;
            configuration.touch(Utc::now());
            self.configurations.persist(&configuration).await?
        } else {
            configuration
        };

        let report = SyncReport {
            event_id,
            groups_processed: accommodation + location,
            failed_groups: failures,
            changed,
        };
        let failed_names: Vec<String> = report.failed_groups.iter().map(|f| f.group.clone()).collect();
        log_sync_report(event_id, report.groups_processed, &failed_names, changed);

        Ok(SyncOutcome { configuration, report })
    }

    /// Move a guest between two groups of the same kind as one unit of work
    pub async fn move_guest(
        &self,
        event_id: Uuid,
        kind: GroupingKind,
        guest_email: &str,
        from_group: &str,
        to_group: &str,
    ) -> Result<Configuration> {
        let email = normalize_email(guest_email);
        let (configuration, (from, to)) = self
            .configurations
            .mutate(event_id, |configuration| match kind {
                GroupingKind::Accommodation => move_between(&mut configuration.groups, kind, &email, from_group, to_group),
                GroupingKind::Location => {
                    move_between(&mut configuration.location_groups, kind, &email, from_group, to_group)
                }
            })
            .await?;

        log_guest_move(event_id, &email, &from, &to);
        Ok(configuration)
    }

    /// Create an accommodation group by staff action
    pub async fn create_group(
        &self,
        event_id: Uuid,
        name: &str,
        capacity: u32,
        description: Option<String>,
    ) -> Result<Configuration> {
        let name = validate_group_name(name)?;
        if capacity == 0 {
            return Err(LogisticsError::validation("capacity", "must be at least 1"));
        }
        let description = description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

        let (configuration, ()) = self
            .configurations
            .mutate(event_id, |configuration| {
                if configuration.group(&name).is_some() {
                    return Err(LogisticsError::validation(
                        "group_name",
                        format!("a group named '{}' already exists", name),
                    ));
                }
                configuration
                    .groups
                    .push(Group::new(&name, capacity, description, GroupOrigin::Manual));
                Ok(())
            })
            .await?;

        info!(event_id = %event_id, group = %name, capacity = capacity, "Group created");
        Ok(configuration)
    }

    /// Delete a group of either kind; its members (and, for a location
    /// group, its flight selections) go with it. Synchronization recreates
    /// the group only if roster guests still map to it.
    pub async fn delete_group(&self, event_id: Uuid, kind: GroupingKind, name: &str) -> Result<Configuration> {
        let (configuration, detached) = self
            .configurations
            .mutate(event_id, |configuration| match kind {
                GroupingKind::Accommodation => {
                    let slot = position_of(&configuration.groups, name)
                        .ok_or_else(|| LogisticsError::not_found("group", name.to_string()))?;
                    Ok(configuration.groups.remove(slot).members.len())
                }
                GroupingKind::Location => {
                    let slot = position_of(&configuration.location_groups, name)
                        .ok_or_else(|| LogisticsError::not_found("location group", name.to_string()))?;
                    Ok(configuration.location_groups.remove(slot).members.len())
                }
            })
            .await?;

        info!(event_id = %event_id, kind = %kind, group = %name, detached = detached, "Group deleted");
        Ok(configuration)
    }

    /// Place a roster guest into an accommodation group by staff action.
    /// The roster is read under the event lock.
    pub async fn add_member(&self, event_id: Uuid, group: &str, guest_email: &str) -> Result<Configuration> {
        let email = normalize_email(guest_email);
        if !is_valid_email(&email) {
            return Err(LogisticsError::validation("email", format!("'{}' is not a valid email", guest_email)));
        }

        let _guard = self.configurations.lock(event_id).await?;
        let guests = self.fetch_roster(event_id).await?;
        if !guests.iter().any(|g| g.key() == email) {
            return Err(LogisticsError::not_found("guest", email));
        }

        let (configuration, ()) = self
            .configurations
            .apply(event_id, |configuration| {
                if let Some(current) = configuration.group_of(&email) {
                    return Err(LogisticsError::validation(
                        "email",
                        format!("{} is already in group '{}'; move the guest instead", email, current.name),
                    ));
                }
                let target = configuration
                    .group_mut(group)
                    .ok_or_else(|| LogisticsError::not_found("group", group.to_string()))?;
                target.push_member(MemberRef::manual(&email));
                Ok(())
            })
            .await?;

        debug!(event_id = %event_id, group = %group, guest = %email, "Member added");
        Ok(configuration)
    }

    pub async fn remove_member(&self, event_id: Uuid, group: &str, guest_email: &str) -> Result<Configuration> {
        let email = normalize_email(guest_email);
        let (configuration, ()) = self
            .configurations
            .mutate(event_id, |configuration| {
                let target = configuration
                    .group_mut(group)
                    .ok_or_else(|| LogisticsError::not_found("group", group.to_string()))?;
                target
                    .remove_member(&email)
                    .map(|_| ())
                    .ok_or_else(|| LogisticsError::not_found("group member", format!("{} in {}", email, group)))
            })
            .await?;

        debug!(event_id = %event_id, group = %group, guest = %email, "Member removed");
        Ok(configuration)
    }

    /// Scoring hints for an accommodation group
    pub async fn set_group_metadata(&self, event_id: Uuid, group: &str, metadata: GroupMetadata) -> Result<Configuration> {
        if let Some(budget) = metadata.budget_per_night {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(LogisticsError::validation("budget_per_night", "must be a positive amount"));
            }
        }
        let metadata = GroupMetadata {
            budget_per_night: metadata.budget_per_night,
            preferred_amenities: normalize_labels(&metadata.preferred_amenities),
        };

        let (configuration, ()) = self
            .configurations
            .mutate(event_id, |configuration| {
                let target = configuration
                    .group_mut(group)
                    .ok_or_else(|| LogisticsError::not_found("group", group.to_string()))?;
                target.metadata = metadata;
                Ok(())
            })
            .await?;

        Ok(configuration)
    }

    /// Staff correction of a location group's origin airport.
    ///
    /// The code must already be three uppercase letters. A different code
    /// drops the group's flight selections since their route no longer holds.
    pub async fn set_origin_code(&self, event_id: Uuid, group: &str, code: &str) -> Result<Configuration> {
        let origin = AirportCode::parse(code)?;

        let (configuration, cleared) = self
            .configurations
            .mutate(event_id, |configuration| {
                let target = configuration.require_location_group_mut(group)?;
                let changed = target.origin != origin;
                target.origin = origin;
                Ok(changed && target.clear_selections())
            })
            .await?;

        info!(event_id = %event_id, group = %group, origin = %code.trim(), cleared_selections = cleared, "Origin code set");
        Ok(configuration)
    }
}

/// Remove from one group and append to another; nothing changes on failure
fn move_between<G: Membership>(
    groups: &mut [G],
    kind: GroupingKind,
    email: &str,
    from_group: &str,
    to_group: &str,
) -> Result<(String, String)> {
    let entity = match kind {
        GroupingKind::Accommodation => "group",
        GroupingKind::Location => "location group",
    };
    let from = position_of(groups, from_group).ok_or_else(|| LogisticsError::not_found(entity, from_group.to_string()))?;
    let to = position_of(groups, to_group).ok_or_else(|| LogisticsError::not_found(entity, to_group.to_string()))?;

    if !groups[from].contains(email) {
        return Err(LogisticsError::not_found(
            "group member",
            format!("{} in {}", email, groups[from].name()),
        ));
    }

    let from_name = groups[from].name().to_string();
    let to_name = groups[to].name().to_string();
    if from == to {
        return Ok((from_name, to_name));
    }

    groups[from].remove_member(email);
    groups[to].push_member(MemberRef::manual(email));
    Ok((from_name, to_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_first_seen_order() {
        let a = Guest::new("a@example.com", "A").with_departure("Delhi (DEL)");
        let b = Guest::new("b@example.com", "B").with_departure("Mumbai (BOM)");
        let c = Guest::new("c@example.com", "C").with_departure("delhi  (del)");
        let d = Guest::new("d@example.com", "D");
        let guests = vec![&a, &b, &c, &d];

        let (partitions, assignment) = partition_by(&guests, |g| g.departure());
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].name, "Delhi (DEL)");
        assert_eq!(partitions[0].members, vec!["a@example.com", "c@example.com"]);
        assert_eq!(partitions[1].name, "Mumbai (BOM)");
        assert!(!assignment.contains_key("d@example.com"));
    }

    #[test]
    fn test_validate_group_name() {
        assert_eq!(validate_group_name("  VIP   Guests ").unwrap(), "VIP Guests");
        assert!(validate_group_name("   ").is_err());
        assert!(validate_group_name(&"x".repeat(MAX_GROUP_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_move_between_requires_membership() {
        let mut groups = vec![
            Group::new("VIP", 2, None, GroupOrigin::Manual),
            Group::new("Family", 4, None, GroupOrigin::Manual),
        ];
        groups[0].push_member(MemberRef::derived("a@example.com"));

        let err = move_between(&mut groups, GroupingKind::Accommodation, "b@example.com", "VIP", "Family").unwrap_err();
        assert!(matches!(err, LogisticsError::NotFound { .. }));

        move_between(&mut groups, GroupingKind::Accommodation, "a@example.com", "vip", "FAMILY").unwrap();
        assert!(groups[0].is_empty());
        assert_eq!(groups[1].members, vec![MemberRef::manual("a@example.com")]);
        assert_eq!(groups[1].members_count, 1);
    }
}
