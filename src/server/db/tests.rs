use crate::types::task::TaskQuery;

use super::{Database, TaskRecord};

pub fn run_all_tests(db: &Database) {
    run_task_tests(db);
    run_rollback_tests(db);
}

fn run_task_tests(db: &Database) {
    let ids = db
        .with_transaction(|tx| {
            let mut ids = Vec::new();
            for (title, checked, owner) in [
                ("Task 1", false, "admin@permit-todo.app"),
                ("Task 2", true, "user@permit-todo.app"),
                ("Task 3", false, "admin@permit-todo.app"),
            ] {
                let task = tx.create_task(TaskRecord::new(title, checked, owner))?;
                assert!(task.create_time > 0);
                assert_eq!(task.create_time, task.update_time);
                ids.push(task.id);
            }
            Ok(ids)
        })
        .unwrap();
    assert_eq!(ids.len(), 3);
    assert!(ids[0] < ids[1] && ids[1] < ids[2]);

    db.with_transaction(|tx| {
        assert!(tx.is_task_exists(ids[0])?);
        assert!(!tx.is_task_exists(9999)?);
        assert!(tx.get_task(9999).is_err());

        let task = tx.get_task(ids[1])?;
        assert_eq!(task.title, "Task 2");
        assert!(task.checked);
        assert_eq!(task.owner, "user@permit-todo.app");

        assert_eq!(tx.count_tasks(None)?, 3);
        assert_eq!(tx.count_tasks(Some("admin@permit-todo.app"))?, 2);
        assert_eq!(tx.count_tasks(Some("nobody@permit-todo.app"))?, 0);

        let tasks = tx.list_tasks(&TaskQuery::default())?;
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Task 1", "Task 2", "Task 3"]);

        let tasks = tx.list_tasks(&TaskQuery {
            owner: Some("admin@permit-todo.app".to_string()),
            ..Default::default()
        })?;
        assert_eq!(tasks.len(), 2);

        let tasks = tx.list_tasks(&TaskQuery {
            checked: Some(true),
            ..Default::default()
        })?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, ids[1]);

        let tasks = tx.list_tasks(&TaskQuery {
            offset: Some(1),
            limit: Some(1),
            ..Default::default()
        })?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, ids[1]);

        let tasks = tx.list_tasks(&TaskQuery {
            offset: Some(2),
            ..Default::default()
        })?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, ids[2]);

        let tasks = tx.list_tasks(&TaskQuery {
            limit: Some(u64::MAX),
            ..Default::default()
        })?;
        assert_eq!(tasks.len(), 3);

        let tasks = tx.list_tasks(&TaskQuery {
            offset: Some(u64::MAX),
            ..Default::default()
        })?;
        assert!(tasks.is_empty());

        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        tx.update_task(ids[0], None, Some(true))?;
        let task = tx.get_task(ids[0])?;
        assert_eq!(task.title, "Task 1");
        assert!(task.checked);

        tx.update_task(ids[0], Some("Task 1 renamed"), None)?;
        let task = tx.get_task(ids[0])?;
        assert_eq!(task.title, "Task 1 renamed");
        assert!(task.checked);

        assert!(tx.update_task(9999, None, Some(true)).is_err());

        tx.delete_task(ids[2])?;
        assert!(!tx.is_task_exists(ids[2])?);
        assert!(tx.delete_task(ids[2]).is_err());
        assert_eq!(tx.count_tasks(None)?, 2);
        Ok(())
    })
    .unwrap();

    // Ids are never reused after a delete
    let task = db
        .with_transaction(|tx| tx.create_task(TaskRecord::new("Task 4", false, "user@permit-todo.app")))
        .unwrap();
    assert!(task.id > ids[2]);
}

fn run_rollback_tests(db: &Database) {
    let before = db.with_transaction(|tx| tx.count_tasks(None)).unwrap();

    let result: anyhow::Result<()> = db.with_transaction(|tx| {
        tx.create_task(TaskRecord::new("Doomed", false, "user@permit-todo.app"))?;
        anyhow::bail!("abort");
    });
    assert!(result.is_err());

    let after = db.with_transaction(|tx| tx.count_tasks(None)).unwrap();
    assert_eq!(before, after);
}
