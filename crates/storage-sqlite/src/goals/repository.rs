use ambitions_core::errors::{DatabaseError, Error, ValidationError};
use ambitions_core::goals::{
    rebase_path, Goal, GoalCriteria, GoalRepositoryTrait, GoalUpdate, NewGoal,
    GOAL_PATH_SEPARATOR,
};
use ambitions_core::Result;

use super::model::{AssigneeDB, GoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{goals, users};
use crate::utils::chunk_for_sqlite;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

type GoalRow = (GoalDB, Option<AssigneeDB>);

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

fn into_goal((goal_db, assignee): GoalRow) -> Goal {
    goal_db.into_goal(assignee)
}

/// Loads goals matching `criteria`, enriched with assignee columns and their
/// direct children.
fn load_goals(conn: &mut SqliteConnection, criteria: &GoalCriteria) -> Result<Vec<Goal>> {
    let mut query = goals::table
        .left_join(users::table)
        .select((GoalDB::as_select(), Option::<AssigneeDB>::as_select()))
        .into_boxed();

    if let Some(assignee) = &criteria.assigned_to {
        query = query.filter(goals::assigned_to.eq(assignee.clone()));
    }
    if let Some(parent) = &criteria.parent_id {
        query = query.filter(goals::parent_id.eq(parent.clone()));
    }
    if let Some(status) = criteria.status {
        query = query.filter(goals::status.eq(status.as_str()));
    }
    if let Some(period) = &criteria.period_id {
        query = query.filter(goals::period_id.eq(period.clone()));
    }
    if criteria.top_level_only {
        query = query.filter(goals::parent_id.is_null());
    }

    let rows: Vec<GoalRow> = query
        .order((goals::created_at.asc(), goals::id.asc()))
        .load(conn)
        .into_core()?;
    let mut loaded: Vec<Goal> = rows.into_iter().map(into_goal).collect();
    attach_laddered_goals(conn, &mut loaded)?;
    Ok(loaded)
}

fn load_goal(conn: &mut SqliteConnection, goal_id: &str) -> Result<Option<Goal>> {
    let row: Option<GoalRow> = goals::table
        .left_join(users::table)
        .select((GoalDB::as_select(), Option::<AssigneeDB>::as_select()))
        .filter(goals::id.eq(goal_id))
        .first(conn)
        .optional()
        .into_core()?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut found = vec![into_goal(row)];
    attach_laddered_goals(conn, &mut found)?;
    Ok(found.pop())
}

fn attach_laddered_goals(conn: &mut SqliteConnection, parents: &mut [Goal]) -> Result<()> {
    let parent_ids: Vec<String> = parents.iter().map(|g| g.id.clone()).collect();
    let mut children: HashMap<String, Vec<Goal>> = HashMap::new();

    for chunk in chunk_for_sqlite(&parent_ids) {
        let rows: Vec<GoalRow> = goals::table
            .left_join(users::table)
            .select((GoalDB::as_select(), Option::<AssigneeDB>::as_select()))
            .filter(goals::parent_id.eq_any(chunk.to_vec()))
            .order((goals::created_at.asc(), goals::id.asc()))
            .load(conn)
            .into_core()?;
        for child in rows.into_iter().map(into_goal) {
            if let Some(parent_id) = child.parent_id.clone() {
                children.entry(parent_id).or_default().push(child);
            }
        }
    }

    for parent in parents.iter_mut() {
        parent.laddered_goals = children.remove(&parent.id).unwrap_or_default();
    }
    Ok(())
}

fn find_goal_db(conn: &mut SqliteConnection, goal_id: &str) -> Result<Option<GoalDB>> {
    goals::table
        .find(goal_id)
        .select(GoalDB::as_select())
        .first::<GoalDB>(conn)
        .optional()
        .into_core()
}

/// Path a goal laddered under `parent_id` gets.
fn path_under(conn: &mut SqliteConnection, parent_id: &str) -> Result<String> {
    find_goal_db(conn, parent_id)?
        .map(|parent| Goal::from(parent).child_path())
        .ok_or_else(|| ValidationError::UnknownParent(parent_id.to_string()).into())
}

/// Rewrites the stored path of every goal below `old_prefix`.
fn rebase_descendants(
    conn: &mut SqliteConnection,
    old_prefix: &str,
    new_prefix: Option<&str>,
) -> Result<usize> {
    let pattern = format!("{}{}%", old_prefix, GOAL_PATH_SEPARATOR);
    let rows: Vec<(String, Option<String>)> = goals::table
        .select((goals::id, goals::path))
        .filter(goals::path.eq(old_prefix).or(goals::path.like(pattern)))
        .load(conn)
        .into_core()?;

    let mut rewritten = 0;
    for (goal_id, path) in rows {
        let Some(new_path) = path
            .as_deref()
            .and_then(|p| rebase_path(p, old_prefix, new_prefix))
        else {
            continue;
        };
        rewritten += diesel::update(goals::table.find(&goal_id))
            .set(goals::path.eq(new_path))
            .execute(conn)
            .into_core()?;
    }
    Ok(rewritten)
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    async fn find_many(&self, criteria: GoalCriteria) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        load_goals(&mut conn, &criteria)
    }

    async fn find_by_id(&self, goal_id: &str) -> Result<Option<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        load_goal(&mut conn, goal_id)
    }

    async fn create(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let path = match new_goal.parent_id.as_deref() {
                    Some(parent_id) => Some(path_under(conn, parent_id)?),
                    None => None,
                };
                let now = Utc::now().naive_utc();
                let goal_db = GoalDB {
                    id: Uuid::new_v4().to_string(),
                    title: new_goal.title,
                    description: new_goal.description,
                    goal_type: new_goal.goal_type,
                    status: new_goal.status.as_str().to_string(),
                    parent_id: new_goal.parent_id,
                    path,
                    assigned_to: new_goal.assigned_to,
                    created_by: new_goal.created_by,
                    period_id: new_goal.period_id,
                    created_at: now,
                    updated_at: now,
                };

                diesel::insert_into(goals::table)
                    .values(&goal_db)
                    .execute(conn)
                    .into_core()?;
                debug!("Inserted goal {}", goal_db.id);

                load_goal(conn, &goal_db.id)?.ok_or_else(|| {
                    Error::Database(DatabaseError::Internal(format!(
                        "Goal {} vanished after insert",
                        goal_db.id
                    )))
                })
            })
            .await
    }

    async fn update(&self, goal_id: &str, goal_update: GoalUpdate) -> Result<Option<Goal>> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<Goal>> {
                let Some(existing) = find_goal_db(conn, &goal_id)? else {
                    return Ok(None);
                };
                let mut goal = Goal::from(existing);
                let old_prefix = goal.child_path();
                let old_parent = goal.parent_id.clone();

                goal_update.apply_to(&mut goal);
                let reparented = goal.parent_id != old_parent;
                if let (true, Some(parent_id)) = (reparented, goal.parent_id.clone()) {
                    goal.path = Some(path_under(conn, &parent_id)?);
                }

                diesel::update(goals::table.find(&goal_id))
                    .set(&GoalDB::from(&goal))
                    .execute(conn)
                    .into_core()?;
                if reparented {
                    let moved = rebase_descendants(conn, &old_prefix, Some(&goal.child_path()))?;
                    debug!("Re-laddered goal {} with {} descendants", goal_id, moved);
                }

                load_goal(conn, &goal_id)
            })
            .await
    }

    async fn delete(&self, goal_id: &str) -> Result<usize> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let Some(existing) = find_goal_db(conn, &goal_id)? else {
                    return Ok(0);
                };
                let prefix = Goal::from(existing).child_path();

                diesel::update(goals::table.filter(goals::parent_id.eq(&goal_id)))
                    .set(goals::parent_id.eq(None::<String>))
                    .execute(conn)
                    .into_core()?;
                rebase_descendants(conn, &prefix, None)?;

                diesel::delete(goals::table.find(&goal_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use crate::users::UserDB;
    use ambitions_core::goals::GoalStatus;
    use tempfile::TempDir;

    fn setup() -> (GoalRepository, Arc<DbPool>, TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("goals.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer((*pool).clone());
        (GoalRepository::new(pool.clone(), writer), pool, tmp)
    }

    fn insert_user(pool: &DbPool, id: &str, image: Option<&str>) {
        let now = Utc::now().naive_utc();
        let mut conn = pool.get().unwrap();
        diesel::insert_into(users::table)
            .values(&UserDB {
                id: id.to_string(),
                email: format!("{}@corp.test", id),
                name: "Ana".to_string(),
                lastname: "Lima".to_string(),
                image: image.map(str::to_string),
                employee_id: None,
                workday_id: None,
                org_id: None,
                job_id: None,
                manager_id: None,
                status: "active".to_string(),
                created_at: now,
                updated_at: now,
            })
            .execute(&mut conn)
            .unwrap();
    }

    fn new_goal(title: &str, parent_id: Option<&str>, assigned_to: Option<&str>) -> NewGoal {
        NewGoal {
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            goal_type: "goal".to_string(),
            status: GoalStatus::Draft,
            parent_id: parent_id.map(str::to_string),
            period_id: Some("2026-H1".to_string()),
            assigned_to: assigned_to.map(str::to_string),
            created_by: assigned_to.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn missing_goal_is_none() {
        let (repo, _pool, _tmp) = setup();
        assert!(repo.find_by_id("does-not-exist").await.unwrap().is_none());
        assert!(repo
            .update("does-not-exist", GoalUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.delete("does-not-exist").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_then_find_enriches_assignee_and_children() {
        let (repo, pool, _tmp) = setup();
        insert_user(&pool, "u1", Some("avatars/ana.png"));

        let parent = repo
            .create(new_goal("Grow revenue", None, Some("u1")))
            .await
            .unwrap();
        assert_eq!(parent.user_name.as_deref(), Some("Ana Lima"));
        assert_eq!(parent.user_image.as_deref(), Some("/avatars/ana.png"));
        assert!(parent.path.is_none());

        let child = repo
            .create(new_goal("Close 3 deals", Some(parent.id.as_str()), None))
            .await
            .unwrap();
        assert_eq!(child.path.as_deref(), Some(parent.id.as_str()));
        assert!(child.user_name.is_none());

        let fetched = repo.find_by_id(&parent.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Grow revenue");
        assert_eq!(fetched.period_id.as_deref(), Some("2026-H1"));
        assert_eq!(fetched.laddered_goals.len(), 1);
        assert_eq!(fetched.laddered_goals[0].id, child.id);
    }

    #[tokio::test]
    async fn create_under_unknown_parent_fails() {
        let (repo, _pool, _tmp) = setup();
        let result = repo.create(new_goal("Orphan", Some("missing"), None)).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::UnknownParent(ref id))) if id == "missing"
        ));
        assert!(repo
            .find_many(GoalCriteria::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn find_many_applies_criteria() {
        let (repo, _pool, _tmp) = setup();
        let root = repo.create(new_goal("Root", None, Some("u1"))).await.unwrap();
        repo.create(new_goal("Child", Some(root.id.as_str()), Some("u2")))
            .await
            .unwrap();
        repo.create(new_goal("Other", None, Some("u2"))).await.unwrap();

        let mine = repo
            .find_many(GoalCriteria::assigned_to("u2"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let top = repo.find_many(GoalCriteria::top_level()).await.unwrap();
        assert_eq!(top.len(), 2);

        let children = repo
            .find_many(GoalCriteria {
                parent_id: Some(root.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].title, "Child");
    }

    #[tokio::test]
    async fn update_relocates_descendant_paths() {
        let (repo, _pool, _tmp) = setup();
        let a = repo.create(new_goal("A", None, None)).await.unwrap();
        let b = repo.create(new_goal("B", None, None)).await.unwrap();
        let c = repo.create(new_goal("C", Some(b.id.as_str()), None)).await.unwrap();

        let moved = repo
            .update(
                &b.id,
                GoalUpdate {
                    parent_id: Some(a.id.clone()),
                    status: Some(GoalStatus::Approved),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.path.as_deref(), Some(a.id.as_str()));
        assert_eq!(moved.status, GoalStatus::Approved);
        assert_eq!(moved.title, "B");

        let c = repo.find_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(c.path, Some(format!("{}/{}", a.id, b.id)));
    }

    #[tokio::test]
    async fn delete_detaches_children() {
        let (repo, _pool, _tmp) = setup();
        let parent = repo.create(new_goal("Parent", None, None)).await.unwrap();
        let child = repo
            .create(new_goal("Child", Some(parent.id.as_str()), None))
            .await
            .unwrap();

        assert_eq!(repo.delete(&parent.id).await.unwrap(), 1);
        assert_eq!(repo.delete(&parent.id).await.unwrap(), 0);

        let child = repo.find_by_id(&child.id).await.unwrap().unwrap();
        assert!(child.parent_id.is_none());
        assert!(child.path.is_none());
    }
}
