//! Database integration tests for the resolver, association manager,
//! completion tracker and leaderboard.
//!
//! Run with `DATABASE_URL` pointing at a PostgreSQL server:
//! `cargo test -- --ignored`

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use campus_api::leaderboard::{aggregation, repository as leaderboard};
use campus_api::lessons::associations::AssociationUpdate;
use campus_api::lessons::repository as lessons;
use campus_api::models::lesson::CreateLesson;
use campus_api::models::user::{NewUser, User};
use campus_api::related_jobs::resolver;
use campus_api::users::{progress, repository as users};
use campus_api::errors::AppError;

async fn create_user(pool: &PgPool, username: &str) -> User {
    users::create(
        pool,
        &NewUser {
            email: format!("{username}@test.com"),
            username: username.to_string(),
            hashed_password: "not-a-real-hash".to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

fn lesson(title: &str) -> CreateLesson {
    CreateLesson {
        title: title.to_string(),
        category: "Data".to_string(),
        ..CreateLesson::default()
    }
}

async fn set_counters(pool: &PgPool, user_id: i64, completed: i64, total: i64) {
    sqlx::query("UPDATE users SET lessons_completed = $2, total_lesson_score = $3 WHERE id = $1")
        .bind(user_id)
        .bind(completed)
        .bind(total)
        .execute(pool)
        .await
        .expect("counter update should succeed");
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_resolve_is_stable(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let first = resolver::resolve(&mut *conn, "Data Analyst", None).await.unwrap();
    let second = resolver::resolve(&mut *conn, "data analyst", None).await.unwrap();
    assert_eq!(first.id, second.id);
    assert!(first.is_active);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_resolve_distinct_positions_create_distinct_rows(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let a = resolver::resolve(&mut *conn, "Data Analyst", None).await.unwrap();
    let b = resolver::resolve(&mut *conn, "Backend Developer", None).await.unwrap();
    assert_ne!(a.id, b.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_resolve_matches_substring(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let full = resolver::resolve(&mut *conn, "Software Engineer", None).await.unwrap();
    let partial = resolver::resolve(&mut *conn, "engineer", None).await.unwrap();
    assert_eq!(full.id, partial.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_resolve_treats_wildcards_literally(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let existing = resolver::resolve(&mut *conn, "Data Analyst", None).await.unwrap();
    let wildcard = resolver::resolve(&mut *conn, "%", None).await.unwrap();
    assert_ne!(existing.id, wildcard.id);
    assert_eq!(wildcard.position, "%");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_resolve_prefers_lowest_id_among_duplicates(pool: PgPool) {
    // Two rows for one position, as left behind by racing first resolves.
    let ids: Vec<i64> = sqlx::query_scalar(
        "INSERT INTO related_jobs (position) VALUES ('Data Analyst'), ('Data Analyst') RETURNING id",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let resolved = resolver::resolve(&mut *conn, "data analyst", None).await.unwrap();
    assert_eq!(resolved.id, *ids.iter().min().unwrap());
}

// ---------------------------------------------------------------------------
// Association manager
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_create_links_positions_and_ids(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let existing = resolver::resolve(&mut *conn, "ML Engineer", None).await.unwrap();
    drop(conn);

    let created = lessons::create(
        &pool,
        CreateLesson {
            related_job_ids: Some(vec![existing.id, 999_999]),
            related_job_positions: Some(vec!["Data Analyst".into(), "  ".into(), "ml engineer".into()]),
            ..lesson("Pandas 101")
        },
    )
    .await
    .unwrap();

    let positions: Vec<&str> = created.related_jobs.iter().map(|j| j.position.as_str()).collect();
    assert_eq!(positions, vec!["ML Engineer", "Data Analyst"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_unchanged_keeps_and_empty_clears(pool: PgPool) {
    let created = lessons::create(
        &pool,
        CreateLesson {
            related_job_positions: Some(vec!["Data Analyst".into()]),
            ..lesson("SQL Joins")
        },
    )
    .await
    .unwrap();
    let id = created.lesson.id;

    let kept = lessons::replace_associations(&pool, id, &AssociationUpdate::Unchanged)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.related_jobs.len(), 1);

    let cleared = lessons::replace_associations(&pool, id, &AssociationUpdate::clear_all())
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.related_jobs.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_update_replaces_rather_than_merges(pool: PgPool) {
    let created = lessons::create(
        &pool,
        CreateLesson {
            related_job_positions: Some(vec!["Data Analyst".into()]),
            ..lesson("Statistics")
        },
    )
    .await
    .unwrap();

    let updated = lessons::update(
        &pool,
        created.lesson.id,
        campus_api::models::lesson::UpdateLesson {
            related_job_positions: Some(vec!["Backend Developer".into()]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    let positions: Vec<&str> = updated.related_jobs.iter().map(|j| j.position.as_str()).collect();
    assert_eq!(positions, vec!["Backend Developer"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_duplicate_title_conflicts(pool: PgPool) {
    lessons::create(&pool, lesson("Intro")).await.unwrap();
    let err = lessons::create(&pool, lesson("Intro")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

// ---------------------------------------------------------------------------
// Completion tracker
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_completion_points(pool: PgPool) {
    let user = create_user(&pool, "ada").await;
    let unscored = lessons::create(&pool, lesson("Unscored")).await.unwrap();
    let scored = lessons::create(
        &pool,
        CreateLesson {
            lesson_score: Some(25),
            ..lesson("Scored")
        },
    )
    .await
    .unwrap();

    let first = progress::complete_lesson(&pool, user.id, unscored.lesson.id).await.unwrap();
    assert_eq!(first.points_earned, 10);
    assert_eq!(first.total_score, 10);

    let second = progress::complete_lesson(&pool, user.id, scored.lesson.id).await.unwrap();
    assert_eq!(second.points_earned, 25);
    assert_eq!(second.total_score, 35);
    assert_eq!(second.total_lessons_completed, 2);

    // No ledger: repeating a lesson counts again.
    let again = progress::complete_lesson(&pool, user.id, scored.lesson.id).await.unwrap();
    assert_eq!(again.total_lessons_completed, 3);
    assert_eq!(again.total_score, 60);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_completion_not_found(pool: PgPool) {
    let user = create_user(&pool, "ada").await;
    let created = lessons::create(&pool, lesson("Exists")).await.unwrap();

    let err = progress::complete_lesson(&pool, user.id, 424_242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = progress::complete_lesson(&pool, 424_242, created.lesson.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_global_leaderboard_order_and_limit(pool: PgPool) {
    let scores = [(3, 30), (4, 120), (2, 120), (1, 5), (6, 60), (5, 90), (0, 0)];
    for (i, (completed, total)) in scores.iter().enumerate() {
        let user = create_user(&pool, &format!("user{i}")).await;
        set_counters(&pool, user.id, *completed, *total).await;
    }

    let ranked = aggregation::rank(leaderboard::ranked_users(&pool, 5).await.unwrap());
    assert_eq!(ranked.len(), 5);
    for pair in ranked.windows(2) {
        let a = (pair[0].total_score, pair[0].lessons_completed);
        let b = (pair[1].total_score, pair[1].lessons_completed);
        assert!(a >= b, "{a:?} should rank at or above {b:?}");
    }
    assert_eq!(ranked[0].total_score, 120);
    assert_eq!(ranked[0].lessons_completed, 4);
    assert_eq!(ranked[0].average_score, 30.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_by_job_estimate(pool: PgPool) {
    for title in ["A", "B", "C"] {
        lessons::create(
            &pool,
            CreateLesson {
                related_job_positions: Some(vec!["Data Analyst".into()]),
                ..lesson(title)
            },
        )
        .await
        .unwrap();
    }
    let user = create_user(&pool, "ada").await;
    set_counters(&pool, user.id, 10, 120).await;

    let jobs = leaderboard::jobs_with_lessons(&pool).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].lesson_count, 3);

    let pool_users = leaderboard::ranked_users(&pool, 10).await.unwrap();
    let top = aggregation::top_performers(&pool_users, jobs[0].lesson_count, 5);
    assert_eq!(top[0].estimated_job_score, 36.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_best_job_requires_completions(pool: PgPool) {
    let user = create_user(&pool, "newbie").await;
    let (app, _dir) = common::build_test_app(pool).await;
    let response = common::get(app, &format!("/api/v1/leaderboard/users/{}/best-job", user.id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_best_job_picks_most_tagged_active_job(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let analyst = resolver::resolve(&mut *conn, "Data Analyst", None).await.unwrap();
    let backend = resolver::resolve(&mut *conn, "Backend Developer", None).await.unwrap();
    let cloud = resolver::resolve(&mut *conn, "Cloud Architect", None).await.unwrap();
    let retired = resolver::resolve(&mut *conn, "Site Reliability", None).await.unwrap();
    drop(conn);

    // analyst: 1, backend: 2, cloud: 2 (tie, higher id), retired: 3 but inactive.
    let tagged: [(&str, Vec<i64>); 4] = [
        ("Intro", vec![analyst.id]),
        ("Services", vec![backend.id, cloud.id, retired.id]),
        ("Deploys", vec![backend.id, cloud.id, retired.id]),
        ("On-call", vec![retired.id]),
    ];
    for (title, ids) in tagged {
        lessons::create(
            &pool,
            CreateLesson {
                related_job_ids: Some(ids),
                ..lesson(title)
            },
        )
        .await
        .unwrap();
    }
    sqlx::query("UPDATE related_jobs SET is_active = FALSE WHERE id = $1")
        .bind(retired.id)
        .execute(&pool)
        .await
        .unwrap();

    let user = create_user(&pool, "ada").await;
    set_counters(&pool, user.id, 10, 100).await;

    let (app, _dir) = common::build_test_app(pool).await;
    let response = common::get(app, &format!("/api/v1/leaderboard/users/{}/best-job", user.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["best_job"]["id"], backend.id);
    assert_eq!(body["best_job"]["lesson_count"], 2);
    assert_eq!(body["estimated_job_score"], 70.0);
    assert_eq!(body["estimated_completed_lessons"], 6);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_by_job_board_over_http(pool: PgPool) {
    for title in ["A", "B", "C"] {
        lessons::create(
            &pool,
            CreateLesson {
                related_job_positions: Some(vec!["Data Analyst".into()]),
                ..lesson(title)
            },
        )
        .await
        .unwrap();
    }
    let backend_lesson = lessons::create(
        &pool,
        CreateLesson {
            related_job_positions: Some(vec!["Backend Developer".into()]),
            ..lesson("D")
        },
    )
    .await
    .unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let first_analyst = resolver::resolve(&mut *conn, "Data Analyst", None).await.unwrap().id;
    drop(conn);

    // A second "Data Analyst" row with its own lesson: the lower id keeps the key.
    let duplicate: i64 = sqlx::query_scalar(
        "INSERT INTO related_jobs (position, company) VALUES ('Data Analyst', 'Other Co') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO lesson_related_jobs (lesson_id, related_job_id) VALUES ($1, $2)")
        .bind(backend_lesson.lesson.id)
        .bind(duplicate)
        .execute(&pool)
        .await
        .unwrap();

    // Exists but tags no lesson, so it has no board.
    let mut conn = pool.acquire().await.unwrap();
    resolver::resolve(&mut *conn, "Cloud Architect", None).await.unwrap();
    drop(conn);

    let ada = create_user(&pool, "ada").await;
    set_counters(&pool, ada.id, 10, 120).await;
    let bob = create_user(&pool, "bob").await;
    set_counters(&pool, bob.id, 5, 50).await;
    create_user(&pool, "newbie").await;

    let (app, _dir) = common::build_test_app(pool).await;
    let response = common::get(app, "/api/v1/leaderboard/by-related-job?limit_per_job=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    let boards = body.as_object().unwrap();
    let mut keys: Vec<&str> = boards.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["Backend Developer", "Data Analyst"]);
    for board in boards.values() {
        assert!(board["top_performers"].as_array().unwrap().len() <= 1);
    }

    let analyst = &boards["Data Analyst"];
    assert_eq!(analyst["job_info"]["id"], first_analyst);
    assert_eq!(analyst["job_info"]["lesson_count"], 3);
    assert_eq!(analyst["top_performers"][0]["username"], "ada");
    assert_eq!(analyst["top_performers"][0]["estimated_job_score"], 36.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_by_job_board_empty_without_ranked_users(pool: PgPool) {
    lessons::create(
        &pool,
        CreateLesson {
            related_job_positions: Some(vec!["Data Analyst".into()]),
            ..lesson("A")
        },
    )
    .await
    .unwrap();
    create_user(&pool, "newbie").await;

    let (app, _dir) = common::build_test_app(pool).await;
    let response = common::get(app, "/api/v1/leaderboard/by-related-job?limit_per_job=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await, json!({}));
}

// ---------------------------------------------------------------------------
// Authentication over HTTP
// ---------------------------------------------------------------------------

async fn register_and_login(app: &axum::Router, username: &str) -> String {
    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "email": format!("{username}@test.com"), "username": username, "password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": username, "password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = common::body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    format!("Bearer {token}")
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_deactivated_user_cannot_complete(pool: PgPool) {
    let created = lessons::create(&pool, lesson("Locked Lesson")).await.unwrap();
    let (app, _dir) = common::build_test_app(pool.clone()).await;
    let auth = register_and_login(&app, "ada").await;

    let user = users::find_by_username(&pool, "ada").await.unwrap().unwrap();
    let response = common::send(
        app.clone(),
        axum::http::Method::PUT,
        &format!("/api/v1/users/{}", user.id),
        Some(json!({ "is_active": false })),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::send(
        app.clone(),
        axum::http::Method::POST,
        &format!("/api/v1/lessons/{}/complete", created.lesson.id),
        None,
        Some(&auth),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = common::send(app, axum::http::Method::GET, "/api/v1/auth/me", None, Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let user = users::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.lessons_completed, 0);
    assert_eq!(user.total_lesson_score, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_register_login_and_complete_via_http(pool: PgPool) {
    let created = lessons::create(&pool, lesson("HTTP Lesson")).await.unwrap();
    let (app, _dir) = common::build_test_app(pool).await;

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "email": "ada@test.com", "username": "ada", "password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "ada", "password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = common::body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = common::send(
        app,
        axum::http::Method::POST,
        &format!("/api/v1/lessons/{}/complete", created.lesson.id),
        None,
        Some(&format!("Bearer {token}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["points_earned"], 10);
    assert_eq!(body["total_lessons_completed"], 1);
}
