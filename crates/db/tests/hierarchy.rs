//! Integration tests for the project hierarchy repositories:
//! - create project -> task -> subtask with experts
//! - upward status propagation on subtask and task writes
//! - cascade delete, including outcomes charged to removed nodes
//! - budget and date aggregates used by the validation rules
//! - budget rollup enforced under concurrent writes

use sqlx::PgPool;
use taskfund_core::accounts::Gender;
use taskfund_core::error::CoreError;
use taskfund_core::status::{PaymentMethod, WorkStatus};
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::Date;
use taskfund_db::error::WriteError;
use taskfund_db::models::outcome::CreateOutcome;
use taskfund_db::models::project::{CreateProject, UpdateProject};
use taskfund_db::models::subtask::{CreateSubTask, UpdateSubTask};
use taskfund_db::models::task::{CreateTask, UpdateTask};
use taskfund_db::models::user::{CreateUser, User};
use taskfund_db::repositories::{
    AccessRepo, ExpertRepo, OutcomeRepo, ProjectRepo, SubTaskRepo, TaskRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, n: u8) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            first_name: format!("User{n}"),
            last_name: "Test".to_string(),
            phone_number: format!("091200000{n:02}"),
            email: format!("user{n}@example.com"),
            gender: Gender::Female,
            image: None,
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
}

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

fn new_project(title: &str) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        ..Default::default()
    }
}

fn new_task(title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        ..Default::default()
    }
}

fn new_subtask(title: &str) -> CreateSubTask {
    CreateSubTask {
        title: title.to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_hierarchy_with_experts(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let expert = new_user(&pool, 2).await;

    let project = ProjectRepo::create(&pool, ceo.id, &new_project("Apollo"), &[expert.id])
        .await
        .unwrap();
    assert_eq!(project.status, WorkStatus::NotStarted);
    assert_eq!(project.image, "projects/default/project_d.png");
    assert_eq!(project.ceo_id, ceo.id);

    let experts = ExpertRepo::list_users(&pool, Target::new(TargetKind::Project, project.id))
        .await
        .unwrap();
    assert_eq!(experts.len(), 1);
    assert_eq!(experts[0].email, "user2@example.com");

    let task = TaskRepo::create(&pool, project.id, ceo.id, &new_task("Design"), &[])
        .await
        .unwrap();
    let subtask = SubTaskRepo::create(&pool, task.id, expert.id, &new_subtask("Sketch"), &[])
        .await
        .unwrap();
    assert_eq!(subtask.task_id, task.id);
    assert_eq!(subtask.manager_id, Some(expert.id));

    let listed = ProjectRepo::list_for_user(&pool, expert.id, 50, 0).await.unwrap();
    assert_eq!(listed.len(), 1, "experts see the project in their list");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_adding_existing_expert_is_idempotent(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let expert = new_user(&pool, 2).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[expert.id])
        .await
        .unwrap();

    ProjectRepo::update(&pool, project.id, &UpdateProject::default(), &[expert.id])
        .await
        .unwrap()
        .unwrap();

    let ids = ExpertRepo::list_user_ids(&pool, Target::new(TargetKind::Project, project.id))
        .await
        .unwrap();
    assert_eq!(ids, vec![expert.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_completing_all_subtasks_completes_task_and_project(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, ceo.id, &new_task("T"), &[]).await.unwrap();
    let first = SubTaskRepo::create(&pool, task.id, ceo.id, &new_subtask("S1"), &[]).await.unwrap();
    let second = SubTaskRepo::create(&pool, task.id, ceo.id, &new_subtask("S2"), &[]).await.unwrap();

    SubTaskRepo::complete(&pool, first.id).await.unwrap().unwrap();
    let task_now = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task_now.status, WorkStatus::NotStarted);

    SubTaskRepo::complete(&pool, second.id).await.unwrap().unwrap();
    let task_now = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task_now.status, WorkStatus::Completed);
    assert!(task_now.completion_date.is_some());

    let project_now = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(project_now.status, WorkStatus::Completed);
    assert!(project_now.completion_date.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_update_through_patch_propagates(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, ceo.id, &new_task("T"), &[]).await.unwrap();
    let subtask = SubTaskRepo::create(&pool, task.id, ceo.id, &new_subtask("S"), &[]).await.unwrap();

    let update = UpdateSubTask {
        status: Some(WorkStatus::Completed),
        ..Default::default()
    };
    let updated = SubTaskRepo::update(&pool, subtask.id, None, &update, &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, WorkStatus::Completed);
    assert!(updated.completion_date.is_some());

    let task_now = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task_now.status, WorkStatus::Completed);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_complete_twice_returns_none(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();

    assert!(ProjectRepo::complete(&pool, project.id).await.unwrap().is_some());
    assert!(ProjectRepo::complete(&pool, project.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_project_cascades_to_children_and_outcomes(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, ceo.id, &new_task("T"), &[]).await.unwrap();
    let subtask = SubTaskRepo::create(&pool, task.id, ceo.id, &new_subtask("S"), &[]).await.unwrap();

    let expense = CreateOutcome {
        title: "Laptop".to_string(),
        description: None,
        price: 100,
        payment_method: PaymentMethod::Cash,
    };
    let outcome = OutcomeRepo::create(&pool, ceo.id, Target::new(TargetKind::SubTask, subtask.id), &expense)
        .await
        .unwrap();

    assert!(ProjectRepo::delete(&pool, project.id).await.unwrap());

    assert!(TaskRepo::find_by_id(&pool, task.id).await.unwrap().is_none());
    assert!(SubTaskRepo::find_by_id(&pool, subtask.id).await.unwrap().is_none());
    assert!(OutcomeRepo::find_by_id(&pool, outcome.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_last_open_subtask_does_not_complete_task(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, ceo.id, &new_task("T"), &[]).await.unwrap();
    let subtask = SubTaskRepo::create(&pool, task.id, ceo.id, &new_subtask("S"), &[]).await.unwrap();

    assert!(SubTaskRepo::delete(&pool, subtask.id).await.unwrap());
    let task_now = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task_now.status, WorkStatus::NotStarted);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_budget_total_and_date_envelope(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();

    let a = TaskRepo::create(
        &pool,
        project.id,
        ceo.id,
        &CreateTask {
            budget: Some(300),
            start_date: Some(d(2030, 3, 1)),
            end_date: Some(d(2030, 4, 1)),
            ..new_task("A")
        },
        &[],
    )
    .await
    .unwrap();
    TaskRepo::create(
        &pool,
        project.id,
        ceo.id,
        &CreateTask {
            budget: Some(200),
            end_date: Some(d(2030, 6, 1)),
            ..new_task("B")
        },
        &[],
    )
    .await
    .unwrap();

    assert_eq!(TaskRepo::budget_total(&pool, project.id, None).await.unwrap(), 500);
    assert_eq!(TaskRepo::budget_total(&pool, project.id, Some(a.id)).await.unwrap(), 200);

    let envelope = TaskRepo::date_envelope(&pool, project.id).await.unwrap();
    assert_eq!(envelope.start, Some(d(2030, 3, 1)));
    assert_eq!(envelope.end, Some(d(2030, 6, 1)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_keeps_dates_already_set(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(
        &pool,
        ceo.id,
        &CreateProject {
            start_date: Some(d(2030, 1, 1)),
            ..new_project("P")
        },
        &[],
    )
    .await
    .unwrap();

    let update = UpdateProject {
        end_date: Some(d(2030, 12, 31)),
        ..Default::default()
    };
    let updated = ProjectRepo::update(&pool, project.id, &update, &[]).await.unwrap().unwrap();
    assert_eq!(updated.start_date, Some(d(2030, 1, 1)));
    assert_eq!(updated.end_date, Some(d(2030, 12, 31)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_owner_chain_for_subtask(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let manager = new_user(&pool, 2).await;
    let sub_manager = new_user(&pool, 3).await;
    let expert = new_user(&pool, 4).await;

    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();
    let task = TaskRepo::create(&pool, project.id, manager.id, &new_task("T"), &[]).await.unwrap();
    let subtask = SubTaskRepo::create(&pool, task.id, sub_manager.id, &new_subtask("S"), &[expert.id])
        .await
        .unwrap();

    let access = AccessRepo::node_access(&pool, Target::new(TargetKind::SubTask, subtask.id))
        .await
        .unwrap()
        .unwrap();
    assert!(access.can_change(ceo.id));
    assert!(access.can_change(manager.id));
    assert!(access.can_change(sub_manager.id));
    assert!(!access.can_change(expert.id));
    assert!(access.can_view(expert.id));

    let missing = AccessRepo::node_access(&pool, Target::new(TargetKind::Task, 9999)).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_task_creates_stay_within_project_budget(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(
        &pool,
        ceo.id,
        &CreateProject {
            budget: Some(1000),
            ..new_project("P")
        },
        &[],
    )
    .await
    .unwrap();

    let mut writers = tokio::task::JoinSet::new();
    for n in 0..8 {
        let pool = pool.clone();
        let (project_id, ceo_id) = (project.id, ceo.id);
        let input = CreateTask {
            budget: Some(600),
            ..new_task(&format!("T{n}"))
        };
        writers.spawn(async move { TaskRepo::create(&pool, project_id, ceo_id, &input, &[]).await });
    }

    let mut created = 0;
    while let Some(joined) = writers.join_next().await {
        match joined.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(
                matches!(err, WriteError::Rejected(CoreError::Validation(_))),
                "unexpected error: {err:?}"
            ),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(TaskRepo::budget_total(&pool, project.id, None).await.unwrap(), 600);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_subtask_creates_stay_within_task_budget(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(&pool, ceo.id, &new_project("P"), &[]).await.unwrap();
    let task = TaskRepo::create(
        &pool,
        project.id,
        ceo.id,
        &CreateTask {
            budget: Some(500),
            ..new_task("T")
        },
        &[],
    )
    .await
    .unwrap();

    let mut writers = tokio::task::JoinSet::new();
    for n in 0..6 {
        let pool = pool.clone();
        let (task_id, ceo_id) = (task.id, ceo.id);
        let input = CreateSubTask {
            budget: Some(200),
            ..new_subtask(&format!("S{n}"))
        };
        writers.spawn(async move { SubTaskRepo::create(&pool, task_id, ceo_id, &input, &[]).await });
    }
    while let Some(joined) = writers.join_next().await {
        let _ = joined.unwrap();
    }

    let total = SubTaskRepo::budget_total(&pool, task.id, None).await.unwrap();
    assert_eq!(total, 400);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_budget_updates_respect_parent_and_children(pool: PgPool) {
    let ceo = new_user(&pool, 1).await;
    let project = ProjectRepo::create(
        &pool,
        ceo.id,
        &CreateProject {
            budget: Some(1000),
            ..new_project("P")
        },
        &[],
    )
    .await
    .unwrap();
    let task = TaskRepo::create(
        &pool,
        project.id,
        ceo.id,
        &CreateTask {
            budget: Some(400),
            ..new_task("T")
        },
        &[],
    )
    .await
    .unwrap();
    SubTaskRepo::create(
        &pool,
        task.id,
        ceo.id,
        &CreateSubTask {
            budget: Some(300),
            ..new_subtask("S")
        },
        &[],
    )
    .await
    .unwrap();

    let shrink_project = UpdateProject {
        budget: Some(300),
        ..Default::default()
    };
    let err = ProjectRepo::update(&pool, project.id, &shrink_project, &[]).await.unwrap_err();
    assert!(matches!(err, WriteError::Rejected(CoreError::Validation(_))));

    let grow_task = UpdateTask {
        budget: Some(1001),
        ..Default::default()
    };
    let err = TaskRepo::update(&pool, task.id, None, &grow_task, &[]).await.unwrap_err();
    assert!(matches!(err, WriteError::Rejected(CoreError::Validation(_))));

    let shrink_task = UpdateTask {
        budget: Some(200),
        ..Default::default()
    };
    let err = TaskRepo::update(&pool, task.id, None, &shrink_task, &[]).await.unwrap_err();
    assert!(matches!(err, WriteError::Rejected(CoreError::Validation(_))));

    let fits = UpdateTask {
        budget: Some(1000),
        ..Default::default()
    };
    let updated = TaskRepo::update(&pool, task.id, None, &fits, &[]).await.unwrap().unwrap();
    assert_eq!(updated.budget, Some(1000));
}
