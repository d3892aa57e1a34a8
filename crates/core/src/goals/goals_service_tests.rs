#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result, ValidationError};
    use crate::goals::{
        Goal, GoalCriteria, GoalRepositoryTrait, GoalService, GoalServiceTrait, GoalStatus,
        GoalUpdate, NewGoal,
    };
    use crate::users::{User, UserServiceTrait, UserStatus};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    // --- Mock GoalRepository ---
    #[derive(Clone, Default)]
    struct MockGoalRepository {
        goals: Arc<Mutex<Vec<Goal>>>,
        created: Arc<Mutex<Vec<NewGoal>>>,
        find_many_calls: Arc<Mutex<usize>>,
    }

    impl MockGoalRepository {
        fn with_goals(goals: Vec<Goal>) -> Self {
            Self {
                goals: Arc::new(Mutex::new(goals)),
                ..Default::default()
            }
        }

        fn create_calls(&self) -> Vec<NewGoal> {
            self.created.lock().unwrap().clone()
        }

        fn find_many_calls(&self) -> usize {
            *self.find_many_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl GoalRepositoryTrait for MockGoalRepository {
        async fn find_many(&self, criteria: GoalCriteria) -> Result<Vec<Goal>> {
            *self.find_many_calls.lock().unwrap() += 1;
            let goals = self.goals.lock().unwrap();
            Ok(goals
                .iter()
                .filter(|g| criteria.matches(g))
                .map(|g| {
                    let mut found = g.clone();
                    found.laddered_goals = goals
                        .iter()
                        .filter(|c| c.parent_id.as_deref() == Some(g.id.as_str()))
                        .cloned()
                        .collect();
                    found
                })
                .collect())
        }

        async fn find_by_id(&self, goal_id: &str) -> Result<Option<Goal>> {
            Ok(self
                .goals
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id == goal_id)
                .cloned())
        }

        async fn create(&self, new_goal: NewGoal) -> Result<Goal> {
            self.created.lock().unwrap().push(new_goal.clone());
            let mut created = goal("created", None, new_goal.assigned_to.as_deref());
            created.title = new_goal.title;
            created.created_by = new_goal.created_by;
            created.parent_id = new_goal.parent_id;
            self.goals.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(&self, goal_id: &str, goal_update: GoalUpdate) -> Result<Option<Goal>> {
            let mut goals = self.goals.lock().unwrap();
            Ok(goals.iter_mut().find(|g| g.id == goal_id).map(|g| {
                goal_update.apply_to(g);
                g.clone()
            }))
        }

        async fn delete(&self, goal_id: &str) -> Result<usize> {
            let mut goals = self.goals.lock().unwrap();
            let before = goals.len();
            goals.retain(|g| g.id != goal_id);
            Ok(before - goals.len())
        }
    }

    // --- Mock UserService ---
    #[derive(Clone, Default)]
    struct MockUserService {
        users: Arc<Mutex<Vec<User>>>,
    }

    impl MockUserService {
        fn with_users(users: Vec<User>) -> Self {
            Self {
                users: Arc::new(Mutex::new(users)),
            }
        }
    }

    #[async_trait]
    impl UserServiceTrait for MockUserService {
        async fn get_user(&self, email: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == user_id)
                .cloned())
        }
    }

    fn user(id: &str, email: &str, manager_id: Option<&str>) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: id.to_uppercase(),
            lastname: "Doe".to_string(),
            image: None,
            employee_id: None,
            workday_id: None,
            org_id: Some("org-1".to_string()),
            job_id: None,
            manager_id: manager_id.map(str::to_string),
            status: UserStatus::Active,
        }
    }

    fn goal(id: &str, parent_id: Option<&str>, assigned_to: Option<&str>) -> Goal {
        let now = Utc::now();
        Goal {
            id: id.to_string(),
            title: format!("Goal {}", id),
            description: None,
            goal_type: "goal".to_string(),
            status: GoalStatus::Draft,
            parent_id: parent_id.map(str::to_string),
            path: parent_id.map(str::to_string),
            assigned_to: assigned_to.map(str::to_string),
            created_by: None,
            period_id: None,
            created_at: now,
            updated_at: now,
            user_name: None,
            user_image: None,
            laddered_goals: Vec::new(),
        }
    }

    fn service(repo: &MockGoalRepository, users: Vec<User>) -> GoalService {
        GoalService::new(
            Arc::new(repo.clone()),
            Arc::new(MockUserService::with_users(users)),
        )
    }

    #[tokio::test]
    async fn create_defaults_assignee_to_acting_user() {
        let repo = MockGoalRepository::default();
        let svc = service(&repo, vec![user("u1", "ana@corp.test", None)]);

        let created = svc
            .create_goal(
                "ana@corp.test",
                NewGoal {
                    title: "Ship v2".to_string(),
                    goal_type: "goal".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let calls = repo.create_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].assigned_to.as_deref(), Some("u1"));
        assert_eq!(calls[0].created_by.as_deref(), Some("u1"));
        assert_eq!(created.assigned_to.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn create_keeps_explicit_assignee_but_overrides_creator() {
        let repo = MockGoalRepository::default();
        let svc = service(&repo, vec![user("u1", "ana@corp.test", None)]);

        svc.create_goal(
            "ana@corp.test",
            NewGoal {
                title: "Coach the team".to_string(),
                goal_type: "goal".to_string(),
                assigned_to: Some("u7".to_string()),
                created_by: Some("someone-else".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let calls = repo.create_calls();
        assert_eq!(calls[0].assigned_to.as_deref(), Some("u7"));
        assert_eq!(calls[0].created_by.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn create_fails_fast_without_acting_user() {
        let repo = MockGoalRepository::default();
        let svc = service(&repo, vec![]);

        let err = svc
            .create_goal(
                "ghost@corp.test",
                NewGoal {
                    title: "Never stored".to_string(),
                    goal_type: "goal".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ActingUserNotFound(email) if email == "ghost@corp.test"));
        assert!(repo.create_calls().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_parent() {
        let repo = MockGoalRepository::default();
        let svc = service(&repo, vec![user("u1", "ana@corp.test", None)]);

        let err = svc
            .create_goal(
                "ana@corp.test",
                NewGoal {
                    title: "Laddered".to_string(),
                    goal_type: "goal".to_string(),
                    parent_id: Some("missing".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnknownParent(_))
        ));
        assert!(repo.create_calls().is_empty());
    }

    #[tokio::test]
    async fn update_rejects_parent_cycles() {
        let repo = MockGoalRepository::with_goals(vec![
            goal("a", None, Some("u1")),
            goal("b", Some("a"), Some("u1")),
            goal("c", Some("b"), Some("u1")),
        ]);
        let svc = service(&repo, vec![user("u1", "ana@corp.test", None)]);

        let err = svc
            .update_goal(
                "ana@corp.test",
                "a",
                GoalUpdate {
                    parent_id: Some("c".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ParentCycle { .. })
        ));

        let self_parent = svc
            .update_goal(
                "ana@corp.test",
                "b",
                GoalUpdate {
                    parent_id: Some("b".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(self_parent.is_err());
    }

    #[tokio::test]
    async fn update_missing_goal_is_none() {
        let repo = MockGoalRepository::default();
        let svc = service(&repo, vec![user("u1", "ana@corp.test", None)]);

        let updated = svc
            .update_goal(
                "ana@corp.test",
                "nope",
                GoalUpdate {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn goals_are_scoped_to_owner_email() {
        let repo = MockGoalRepository::with_goals(vec![
            goal("a", None, Some("u1")),
            goal("b", None, Some("u2")),
        ]);
        let svc = service(
            &repo,
            vec![
                user("u1", "ana@corp.test", None),
                user("u2", "bo@corp.test", None),
            ],
        );

        let mine = svc.get_goals(Some("ana@corp.test")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "a");

        let unknown = svc.get_goals(Some("nobody@corp.test")).await.unwrap();
        assert!(unknown.is_empty());

        let all = svc.get_goals(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn delete_unknown_goal_reports_zero() {
        let repo = MockGoalRepository::with_goals(vec![goal("a", None, None)]);
        let svc = service(&repo, vec![]);

        assert_eq!(svc.delete_goal("zzz").await.unwrap(), 0);
        assert_eq!(svc.delete_goal("a").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn filters_group_and_count() {
        let mut approved = goal("b", None, Some("u1"));
        approved.status = GoalStatus::Approved;
        approved.period_id = Some("2026-H1".to_string());
        approved.user_name = Some("Ana Doe".to_string());
        let mut draft = goal("a", None, Some("u1"));
        draft.user_name = Some("Ana Doe".to_string());
        draft.period_id = Some("2026-H1".to_string());

        let repo = MockGoalRepository::with_goals(vec![draft, approved, goal("c", None, None)]);
        let svc = service(&repo, vec![]);

        let filters = svc.get_goal_filters(None).await.unwrap();
        assert_eq!(filters.statuses.len(), 2);
        let draft_option = filters
            .statuses
            .iter()
            .find(|o| o.value == "draft")
            .unwrap();
        assert_eq!(draft_option.count, 2);
        assert_eq!(draft_option.label, "Draft");
        assert_eq!(filters.owners.len(), 1);
        assert_eq!(filters.owners[0].label, "Ana Doe");
        assert_eq!(filters.owners[0].count, 2);
        assert_eq!(filters.periods[0].count, 2);
        assert_eq!(filters.types[0].count, 3);
    }

    #[tokio::test]
    async fn manager_ambitions_list_managers_top_level_goals() {
        let mut archived = goal("old", None, Some("m1"));
        archived.status = GoalStatus::Archived;
        let repo = MockGoalRepository::with_goals(vec![
            goal("amb-1", None, Some("m1")),
            goal("amb-2", None, Some("m1")),
            archived,
            goal("child-1", Some("amb-1"), Some("u1")),
            goal("child-2", Some("amb-1"), Some("u2")),
            goal("mine", None, Some("u1")),
        ]);
        let svc = service(
            &repo,
            vec![
                user("m1", "boss@corp.test", None),
                user("u1", "ana@corp.test", Some("m1")),
            ],
        );

        let data = svc.get_manager_ambitions("ana@corp.test").await.unwrap();
        assert_eq!(data.manager.as_ref().map(|m| m.id.as_str()), Some("m1"));
        assert_eq!(data.ambitions.len(), 2);
        let first = data
            .ambitions
            .iter()
            .find(|a| a.goal.id == "amb-1")
            .unwrap();
        assert_eq!(first.laddered_count, 2);
        assert_eq!(repo.find_many_calls(), 1);
    }

    #[tokio::test]
    async fn manager_ambitions_empty_without_manager() {
        let repo = MockGoalRepository::with_goals(vec![goal("amb-1", None, Some("m1"))]);
        let svc = service(&repo, vec![user("m1", "boss@corp.test", None)]);

        let data = svc.get_manager_ambitions("boss@corp.test").await.unwrap();
        assert!(data.manager.is_none());
        assert!(data.ambitions.is_empty());

        let unknown = svc.get_manager_ambitions("who@corp.test").await.unwrap();
        assert!(unknown.ambitions.is_empty());
    }

    #[tokio::test]
    async fn ambitions_are_top_level_goals() {
        let repo = MockGoalRepository::with_goals(vec![
            goal("amb-1", None, None),
            goal("child", Some("amb-1"), None),
        ]);
        let svc = service(&repo, vec![]);

        let ambitions = svc.get_ambitions().await.unwrap();
        assert_eq!(ambitions.len(), 1);
        assert_eq!(ambitions[0].id, "amb-1");
    }
}
