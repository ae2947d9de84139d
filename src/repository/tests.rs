//! Repository Integration Tests
//!
//! Jar, membership, idea and pool repositories against in-memory SQLite.

#[cfg(test)]
mod tests {
    use crate::domain::{
        ApprovalState, CostTier, DomainError, Idea, Jar, MemberRole, MemberStatus, Setting, SpinFilters,
    };
    use crate::repository::{
        init_db, AllocationOperations, DbState, IdeaJarOperations, IdeaModerationOperations, IdeaRepository,
        JarRepository, MembershipRepository, PoolRepository, Repository, SpinOperations,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        jars: JarRepository,
        members: MembershipRepository,
        ideas: IdeaRepository,
        pool: PoolRepository,
    }

    fn fixture_from(db: &DbState, seed: u64) -> Fixture {
        Fixture {
            jars: JarRepository::new(db.handle()),
            members: MembershipRepository::new(db.handle()),
            ideas: IdeaRepository::new(db.handle()),
            pool: PoolRepository::with_rng(db.handle(), StdRng::seed_from_u64(seed)),
        }
    }

    async fn setup_test_db() -> Fixture {
        // Use in-memory database for tests
        let db = init_db(Path::new(":memory:"), Duration::from_secs(1))
            .await
            .expect("Failed to init test DB");
        fixture_from(&db, 17)
    }

    /// Jar owned by "owner" plus `extra` active members and `ideas` approved ideas
    async fn seed_jar(f: &Fixture, extra: &[&str], ideas: usize) -> u32 {
        let (jar, _) = f
            .jars
            .create_with_owner(&Jar::new(0, "Date night".to_string()), "owner")
            .await
            .unwrap();
        for p in extra {
            f.members.add(jar.id, p, MemberRole::Member, MemberStatus::Active).await.unwrap();
        }
        for i in 0..ideas {
            let mut idea = Idea::new(0, jar.id, "owner", format!("Idea {}", i));
            idea.state = ApprovalState::Approved;
            f.ideas.create(&idea).await.unwrap();
        }
        jar.id
    }

    // ----- jars & memberships -----

    #[tokio::test]
    async fn test_create_jar_with_owner() {
        let f = setup_test_db().await;

        let (jar, owner) = f
            .jars
            .create_with_owner(&Jar::new(0, "  Family  ".to_string()), "alice")
            .await
            .expect("Failed to create");

        assert!(jar.id > 0);
        assert_eq!(jar.name, "Family");
        assert_eq!(owner.role, MemberRole::Owner);
        assert!(owner.is_active());

        let found = f.members.find(jar.id, "alice").await.unwrap().unwrap();
        assert_eq!(found.role, MemberRole::Owner);
    }

    #[tokio::test]
    async fn test_empty_jar_name_rejected() {
        let f = setup_test_db().await;
        let err = f.jars.create(&Jar::new(0, "   ".to_string())).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_rename_and_list_jars() {
        let f = setup_test_db().await;
        let a = f.jars.create(&Jar::new(0, "A".to_string())).await.unwrap();
        f.jars.create(&Jar::new(0, "B".to_string())).await.unwrap();

        let renamed = f.jars.rename(a.id, "Weekend").await.unwrap();
        assert_eq!(renamed.name, "Weekend");

        let jars = f.jars.list().await.unwrap();
        assert_eq!(jars.len(), 2);
        assert_eq!(jars[0].name, "Weekend");
    }

    #[tokio::test]
    async fn test_delete_jar_cascades() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 3).await;

        f.jars.delete(jar_id).await.expect("Delete failed");

        assert!(f.jars.find_by_id(jar_id).await.unwrap().is_none());
        assert!(f.ideas.list_by_jar(jar_id).await.unwrap().is_empty());
        assert!(f.members.list_by_jar(jar_id).await.unwrap().is_empty());
        assert!(matches!(f.jars.delete(jar_id).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_membership_rejected() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 0).await;

        let err = f
            .members
            .add(jar_id, "bob", MemberRole::Admin, MemberStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_membership_status_and_role() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 0).await;
        f.members.add(jar_id, "carol", MemberRole::Member, MemberStatus::Pending).await.unwrap();

        let m = f.members.set_status(jar_id, "carol", MemberStatus::Active).await.unwrap();
        assert!(m.is_active());
        let m = f.members.set_role(jar_id, "carol", MemberRole::Admin).await.unwrap();
        assert_eq!(m.role, MemberRole::Admin);

        let order: Vec<String> = f
            .members
            .list_by_jar(jar_id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.participant_id)
            .collect();
        assert_eq!(order, vec!["owner", "carol"]);

        assert!(matches!(
            f.members.set_status(jar_id, "nobody", MemberStatus::Active).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    // ----- ideas -----

    #[tokio::test]
    async fn test_idea_round_trip_keeps_attributes() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 0).await;

        let mut idea = Idea::new(0, jar_id, "owner", "Stargazing");
        idea.cost = CostTier::Low;
        idea.setting = Setting::Outdoor;
        idea.duration_minutes = Some(120);
        idea.details = Some("Bring a blanket".to_string());
        let created = f.ideas.create(&idea).await.unwrap();

        let found = f.ideas.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.description, "Stargazing");
        assert_eq!(found.cost, CostTier::Low);
        assert_eq!(found.setting, Setting::Outdoor);
        assert_eq!(found.duration_minutes, Some(120));
        assert_eq!(found.details.as_deref(), Some("Bring a blanket"));
    }

    #[tokio::test]
    async fn test_submit_respects_approval_policy() {
        let f = setup_test_db().await;
        let mut jar = f.jars.create(&Jar::new(0, "Moderated".to_string())).await.unwrap();
        jar.requires_approval = true;
        f.jars.update(&jar).await.unwrap();

        let from_member = f
            .ideas
            .submit(&Idea::new(0, jar.id, "bob", "Karaoke"), MemberRole::Member)
            .await
            .unwrap();
        assert_eq!(from_member.state, ApprovalState::Pending);

        let from_admin = f
            .ideas
            .submit(&Idea::new(0, jar.id, "amy", "Bowling"), MemberRole::Admin)
            .await
            .unwrap();
        assert_eq!(from_admin.state, ApprovalState::Approved);

        let approved = f.ideas.approve(from_member.id).await.unwrap();
        assert_eq!(approved.state, ApprovalState::Approved);

        let rejected = f.ideas.reject(from_admin.id).await.unwrap();
        assert_eq!(rejected.state, ApprovalState::Rejected);
    }

    #[tokio::test]
    async fn test_submit_to_open_jar_is_approved() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 0).await;
        let idea = f
            .ideas
            .submit(&Idea::new(0, jar_id, "bob", "Board games"), MemberRole::Member)
            .await
            .unwrap();
        assert_eq!(idea.state, ApprovalState::Approved);
    }

    #[tokio::test]
    async fn test_submit_to_missing_jar() {
        let f = setup_test_db().await;
        let err = f
            .ideas
            .submit(&Idea::new(0, 99, "bob", "Nothing"), MemberRole::Member)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bulk_delete_stays_in_jar() {
        let f = setup_test_db().await;
        let a = seed_jar(&f, &[], 3).await;
        let b = seed_jar(&f, &[], 1).await;

        let a_ids: Vec<u32> = f.ideas.list_by_jar(a).await.unwrap().iter().map(|i| i.id).collect();
        let b_ids: Vec<u32> = f.ideas.list_by_jar(b).await.unwrap().iter().map(|i| i.id).collect();

        let removed = f.ideas.bulk_delete(a, &[a_ids[0], a_ids[1], b_ids[0]]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(f.ideas.list_by_jar(a).await.unwrap().len(), 1);
        assert_eq!(f.ideas.list_by_jar(b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_removes_every_idea() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 4).await;
        f.pool.allocate(jar_id, 1).await.unwrap();
        f.ideas
            .submit(&Idea::new(0, jar_id, "bob", "Pending one"), MemberRole::Member)
            .await
            .unwrap();

        let removed = f.jars.reset(jar_id).await.unwrap();
        assert_eq!(removed, 5);
        assert!(f.ideas.list_by_jar(jar_id).await.unwrap().is_empty());
        // Members survive a reset
        assert_eq!(f.members.list_by_jar(jar_id).await.unwrap().len(), 2);
    }

    // ----- allocation -----

    #[tokio::test]
    async fn test_allocation_scenario_six_ideas_two_members() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 6).await;

        let outcome = f.pool.allocate(jar_id, 2).await.expect("Allocation failed");
        assert_eq!(outcome.allocated_count, 4);
        assert_eq!(outcome.assignments.len(), 2);

        let ideas = f.ideas.list_by_jar(jar_id).await.unwrap();
        let mut per_member: HashMap<String, usize> = HashMap::new();
        for idea in &ideas {
            if let Some(owner) = &idea.assigned_to {
                *per_member.entry(owner.clone()).or_default() += 1;
            }
        }
        assert_eq!(per_member.get("owner"), Some(&2));
        assert_eq!(per_member.get("bob"), Some(&2));
        assert_eq!(ideas.iter().filter(|i| i.assigned_to.is_none()).count(), 2);
    }

    #[tokio::test]
    async fn test_allocation_persists_the_returned_groups() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob", "carol"], 9).await;

        let outcome = f.pool.allocate(jar_id, 3).await.unwrap();

        let mut seen = HashSet::new();
        for assignment in &outcome.assignments {
            let stored: HashSet<u32> = f
                .ideas
                .list_assigned_to(jar_id, &assignment.participant_id)
                .await
                .unwrap()
                .iter()
                .map(|i| i.id)
                .collect();
            let planned: HashSet<u32> = assignment.idea_ids.iter().copied().collect();
            assert_eq!(stored, planned);
            for id in planned {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 9);
    }

    #[tokio::test]
    async fn test_insufficient_supply_mutates_nothing() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 3).await;
        let before = f.ideas.list_by_jar(jar_id).await.unwrap();

        let err = f.pool.allocate(jar_id, 2).await.unwrap_err();
        assert_eq!(err, DomainError::InsufficientSupply { required: 4, available: 3 });

        let after = f.ideas.list_by_jar(jar_id).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_allocation_without_active_members() {
        let f = setup_test_db().await;
        let jar = f.jars.create(&Jar::new(0, "Empty".to_string())).await.unwrap();
        f.members.add(jar.id, "bob", MemberRole::Member, MemberStatus::Pending).await.unwrap();

        let err = f.pool.allocate(jar.id, 1).await.unwrap_err();
        assert_eq!(err, DomainError::NoActiveParticipants);
    }

    #[tokio::test]
    async fn test_allocation_skips_inactive_members_and_unapproved_ideas() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 2).await;
        f.members.add(jar_id, "pat", MemberRole::Member, MemberStatus::Pending).await.unwrap();
        f.members.add(jar_id, "rex", MemberRole::Member, MemberStatus::Rejected).await.unwrap();
        f.ideas.create(&Idea::new(0, jar_id, "bob", "Still pending")).await.unwrap();

        let eligibility = f.pool.eligibility(jar_id).await.unwrap();
        assert_eq!(eligibility.participants, vec!["owner", "bob"]);
        assert_eq!(eligibility.idea_ids.len(), 2);

        let outcome = f.pool.allocate(jar_id, 1).await.unwrap();
        let receivers: Vec<&str> = outcome.assignments.iter().map(|a| a.participant_id.as_str()).collect();
        assert_eq!(receivers, vec!["owner", "bob"]);
    }

    #[tokio::test]
    async fn test_eligibility_shrinks_after_allocation() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 7).await;

        let before = f.pool.eligibility(jar_id).await.unwrap();
        let outcome = f.pool.allocate(jar_id, 2).await.unwrap();
        let after = f.pool.eligibility(jar_id).await.unwrap();

        let allocated: HashSet<u32> = outcome.assignments.iter().flat_map(|a| a.idea_ids.clone()).collect();
        let expected: Vec<u32> = before
            .idea_ids
            .into_iter()
            .filter(|id| !allocated.contains(id))
            .collect();
        assert_eq!(after.idea_ids, expected);
        assert_eq!(after.idea_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_eligibility_for_missing_jar() {
        let f = setup_test_db().await;
        assert!(matches!(f.pool.eligibility(404).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_zero_quota_is_invalid() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 2).await;
        assert!(matches!(f.pool.allocate(jar_id, 0).await, Err(DomainError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_allocations_share_one_pool() {
        let f = Arc::new(setup_test_db().await);
        let jar_id = seed_jar(&f, &["bob"], 6).await;

        let (first, second) = tokio::join!(f.pool.allocate(jar_id, 2), f.pool.allocate(jar_id, 2));
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| *r == Err(DomainError::InsufficientSupply { required: 4, available: 2 })));

        let assigned = f
            .ideas
            .list_by_jar(jar_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.assigned_to.is_some())
            .count();
        assert_eq!(assigned, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_allocations_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.db");

        let db_a = init_db(&path, Duration::from_secs(5)).await.unwrap();
        let db_b = init_db(&path, Duration::from_secs(5)).await.unwrap();
        let a = fixture_from(&db_a, 1);
        let jar_id = seed_jar(&a, &["bob"], 6).await;

        let pool_a = Arc::new(a.pool);
        let pool_b = Arc::new(PoolRepository::with_rng(db_b.handle(), StdRng::seed_from_u64(2)));

        let t1 = tokio::spawn({
            let pool = pool_a.clone();
            async move { pool.allocate(jar_id, 2).await }
        });
        let t2 = tokio::spawn({
            let pool = pool_b.clone();
            async move { pool.allocate(jar_id, 2).await }
        });
        let results = [t1.await.unwrap(), t2.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for r in &results {
            if let Err(e) = r {
                assert!(
                    matches!(e, DomainError::InsufficientSupply { .. }) || e.is_retryable(),
                    "unexpected error {:?}",
                    e
                );
            }
        }

        let ideas = a.ideas.list_by_jar(jar_id).await.unwrap();
        assert_eq!(ideas.iter().filter(|i| i.assigned_to.is_some()).count(), 4);
    }

    // ----- spin -----

    #[tokio::test]
    async fn test_spin_marks_idea_selected() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 3).await;

        let chosen = f.pool.spin(jar_id, "owner", &SpinFilters::default()).await.unwrap();
        assert!(chosen.selected_at.is_some());
        assert_eq!(chosen.selected_by.as_deref(), Some("owner"));

        let history = f.ideas.list_selected(jar_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, chosen.id);
    }

    #[tokio::test]
    async fn test_spin_never_repeats_until_exhausted() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 3).await;

        let mut picked = HashSet::new();
        for _ in 0..3 {
            let idea = f.pool.spin(jar_id, "owner", &SpinFilters::default()).await.unwrap();
            assert!(picked.insert(idea.id));
        }
        assert_eq!(
            f.pool.spin(jar_id, "owner", &SpinFilters::default()).await,
            Err(DomainError::NoMatchingItems)
        );
    }

    #[tokio::test]
    async fn test_spin_honors_filters() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 0).await;
        for (i, cost) in [CostTier::Free, CostTier::High, CostTier::Low, CostTier::High].iter().enumerate() {
            let mut idea = Idea::new(0, jar_id, "owner", format!("Idea {}", i));
            idea.state = ApprovalState::Approved;
            idea.cost = *cost;
            idea.duration_minutes = Some(30 * (i as u32 + 1));
            f.ideas.create(&idea).await.unwrap();
        }

        let filters = SpinFilters {
            costs: vec![CostTier::High],
            max_minutes: Some(90),
            ..Default::default()
        };
        let chosen = f.pool.spin(jar_id, "owner", &filters).await.unwrap();
        assert_eq!(chosen.cost, CostTier::High);
        assert_eq!(chosen.duration_minutes, Some(60));

        // The only other high-cost idea is 120 minutes long
        assert_eq!(f.pool.spin(jar_id, "owner", &filters).await, Err(DomainError::NoMatchingItems));
    }

    #[tokio::test]
    async fn test_spin_excludes_seen_ids_and_others_allocations() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 4).await;
        f.pool.allocate(jar_id, 2).await.unwrap();

        let bobs: Vec<u32> = f
            .ideas
            .list_assigned_to(jar_id, "bob")
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();

        let filters = SpinFilters {
            exclude_ids: vec![bobs[0]],
            ..Default::default()
        };
        let chosen = f.pool.spin(jar_id, "bob", &filters).await.unwrap();
        assert_eq!(chosen.id, bobs[1]);

        assert_eq!(f.pool.spin(jar_id, "bob", &filters).await, Err(DomainError::NoMatchingItems));
    }

    #[tokio::test]
    async fn test_spin_ignores_pending_ideas() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 0).await;
        f.ideas.create(&Idea::new(0, jar_id, "owner", "Unapproved")).await.unwrap();

        assert_eq!(
            f.pool.spin(jar_id, "owner", &SpinFilters::default()).await,
            Err(DomainError::NoMatchingItems)
        );
    }

    #[tokio::test]
    async fn test_return_to_pool_makes_idea_spinnable_again() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 1).await;

        let chosen = f.pool.spin(jar_id, "owner", &SpinFilters::default()).await.unwrap();
        let returned = f.ideas.return_to_pool(chosen.id).await.unwrap();
        assert!(!returned.is_selected());

        let again = f.pool.spin(jar_id, "owner", &SpinFilters::default()).await.unwrap();
        assert_eq!(again.id, chosen.id);
    }

    #[tokio::test]
    async fn test_concurrent_spins_share_one_pool() {
        let f = Arc::new(setup_test_db().await);
        let jar_id = seed_jar(&f, &["bob"], 1).await;
        let filters = SpinFilters::default();

        let (first, second) = tokio::join!(
            f.pool.spin(jar_id, "owner", &filters),
            f.pool.spin(jar_id, "bob", &filters)
        );
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| *r == Err(DomainError::NoMatchingItems)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_spins_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.db");

        let db_a = init_db(&path, Duration::from_secs(5)).await.unwrap();
        let db_b = init_db(&path, Duration::from_secs(5)).await.unwrap();
        let a = fixture_from(&db_a, 3);
        let jar_id = seed_jar(&a, &["bob"], 1).await;

        let pool_a = Arc::new(a.pool);
        let pool_b = Arc::new(PoolRepository::with_rng(db_b.handle(), StdRng::seed_from_u64(4)));

        let t1 = tokio::spawn({
            let pool = pool_a.clone();
            async move { pool.spin(jar_id, "owner", &SpinFilters::default()).await }
        });
        let t2 = tokio::spawn({
            let pool = pool_b.clone();
            async move { pool.spin(jar_id, "bob", &SpinFilters::default()).await }
        });
        let results = [t1.await.unwrap(), t2.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for r in &results {
            if let Err(e) = r {
                assert!(
                    *e == DomainError::NoMatchingItems || e.is_retryable(),
                    "unexpected error {:?}",
                    e
                );
            }
        }

        let history = a.ideas.list_selected(jar_id).await.unwrap();
        assert_eq!(history.len(), 1);
        let winner = results.iter().find_map(|r| r.as_ref().ok()).unwrap();
        assert_eq!(history[0].selected_by, winner.selected_by);
    }

    // ----- edits racing the pool -----

    #[tokio::test]
    async fn test_stale_edit_keeps_allocation() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &["bob"], 2).await;
        let ids: Vec<u32> = f.ideas.list_by_jar(jar_id).await.unwrap().iter().map(|i| i.id).collect();

        // Loaded before the allocation commits
        let mut stale = f.ideas.find_by_id(ids[0]).await.unwrap().unwrap();
        let outcome = f.pool.allocate(jar_id, 1).await.unwrap();
        let owner_of = |id: u32| {
            outcome
                .assignments
                .iter()
                .find(|a| a.idea_ids.contains(&id))
                .map(|a| a.participant_id.clone())
        };

        stale.description = "Edited".to_string();
        stale.cost = CostTier::Medium;
        let edited = f.ideas.update(&stale).await.unwrap();

        assert_eq!(edited.description, "Edited");
        assert_eq!(edited.cost, CostTier::Medium);
        assert_eq!(edited.assigned_to, owner_of(ids[0]));

        let stored = f.ideas.find_by_id(ids[0]).await.unwrap().unwrap();
        assert_eq!(stored.assigned_to, owner_of(ids[0]));
        assert!(f.pool.eligibility(jar_id).await.unwrap().idea_ids.is_empty());
        assert_eq!(
            f.pool.allocate(jar_id, 1).await,
            Err(DomainError::InsufficientSupply { required: 2, available: 0 })
        );
    }

    #[tokio::test]
    async fn test_stale_edit_keeps_selection_and_state() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 1).await;
        let id = f.ideas.list_by_jar(jar_id).await.unwrap()[0].id;

        let mut stale = f.ideas.find_by_id(id).await.unwrap().unwrap();
        let chosen = f.pool.spin(jar_id, "owner", &SpinFilters::default()).await.unwrap();

        stale.details = Some("Book ahead".to_string());
        stale.state = ApprovalState::Pending;
        f.ideas.update(&stale).await.unwrap();

        let stored = f.ideas.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.details.as_deref(), Some("Book ahead"));
        assert_eq!(stored.state, ApprovalState::Approved);
        assert_eq!(stored.selected_at, chosen.selected_at);
        assert_eq!(stored.selected_by.as_deref(), Some("owner"));
    }

    #[tokio::test]
    async fn test_reject_refuses_allocated_idea() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 1).await;
        let id = f.ideas.list_by_jar(jar_id).await.unwrap()[0].id;

        // Looked free when checked, allocated before the reject lands
        assert!(!f.ideas.find_by_id(id).await.unwrap().unwrap().is_assigned());
        f.pool.allocate(jar_id, 1).await.unwrap();

        let err = f.ideas.reject(id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));

        let stored = f.ideas.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.state, ApprovalState::Approved);
        assert_eq!(stored.assigned_to.as_deref(), Some("owner"));

        assert!(matches!(f.ideas.reject(9999).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reject_refuses_selected_idea() {
        let f = setup_test_db().await;
        let jar_id = seed_jar(&f, &[], 1).await;
        let chosen = f.pool.spin(jar_id, "owner", &SpinFilters::default()).await.unwrap();

        assert!(matches!(f.ideas.reject(chosen.id).await, Err(DomainError::InvalidInput { .. })));

        f.ideas.return_to_pool(chosen.id).await.unwrap();
        let rejected = f.ideas.reject(chosen.id).await.unwrap();
        assert_eq!(rejected.state, ApprovalState::Rejected);
    }

    #[tokio::test]
    async fn test_closed_database_reports_not_initialized() {
        let db = init_db(Path::new(":memory:"), Duration::from_secs(1)).await.unwrap();
        let f = fixture_from(&db, 1);
        db.close().await;

        assert!(matches!(f.jars.list().await, Err(DomainError::Internal { .. })));
    }
}
