//! Both SQL backends driven through the same scenario against PostgreSQL.
//!
//! `#[sqlx::test]` creates a throwaway database per test and applies
//! `migrations/`. Run with `DATABASE_URL` set and `cargo test -- --ignored`.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::{NewUser, UserInput};
use crate::users::query::{SortField, UserSearch};
use crate::users::repository::{MapperUserRepository, OrmUserRepository, UserRepository};
use crate::users::service::{DataSource, UserService};

fn input(username: &str, email: &str) -> UserInput {
    UserInput {
        username: username.to_string(),
        email: email.to_string(),
        full_name: None,
        is_active: None,
    }
}

async fn exercise(repo: Arc<dyn UserRepository>, source: DataSource) {
    let service = UserService::new(repo.clone(), source, None, 100);

    let alice = service
        .create(UserInput {
            full_name: Some("Alice Kim".to_string()),
            ..input("alice", "alice@gmail.com")
        })
        .await
        .unwrap();
    let bob = service.create(input("bob", "bob@notgmail.com")).await.unwrap();
    let carol = service
        .create(UserInput {
            is_active: Some(false),
            ..input("carol", "carol@yahoo.com")
        })
        .await
        .unwrap();

    // Microsecond stamps survive the round trip unchanged
    let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored, alice);
    assert_eq!(stored.created_at, stored.updated_at);
    assert!(!carol.is_active);

    // updated_at moves strictly forward even when the clock does not
    let first = service
        .update(alice.id, input("alice", "alice@gmail.com"))
        .await
        .unwrap();
    let second = repo
        .update(alice.id, &input("alice", "alice@gmail.com"), first.updated_at)
        .await
        .unwrap()
        .unwrap();
    assert!(first.updated_at > alice.created_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.full_name, None);
    assert!(second.is_active);

    // Unique violations raised by the table surface as conflicts
    let err = service
        .update(bob.id, input("alice", "bob@notgmail.com"))
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::Conflict(m) if m.contains("username")));
    assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);

    let stamp = Utc::now().trunc_subsecs(6);
    let err = repo
        .insert(&NewUser {
            username: "dave".to_string(),
            email: "carol@yahoo.com".to_string(),
            full_name: None,
            is_active: true,
            created_at: stamp,
            updated_at: stamp,
        })
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::Conflict(m) if m.contains("email")));

    // Absent filters pass every row through
    let everyone = repo.search(&UserSearch::default()).await.unwrap();
    assert_eq!(everyone.len(), 3);

    let mixed = repo
        .search(&UserSearch {
            username: Some("ALI".to_string()),
            is_active: Some(true),
            ..UserSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(mixed.len(), 1);
    assert_eq!(mixed[0].id, alice.id);

    let literal = repo
        .search(&UserSearch {
            full_name: Some("%".to_string()),
            ..UserSearch::default()
        })
        .await
        .unwrap();
    assert!(literal.is_empty());

    let gmail = repo.find_by_email_domain("gmail.com").await.unwrap();
    assert_eq!(gmail.len(), 2);

    // A NULL limit returns everything
    assert_eq!(repo.find_recent(None).await.unwrap().len(), 3);
    let newest = repo.find_recent(Some(1)).await.unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].id, carol.id);

    let page = repo.find_page(0, 2, SortField::Username).await.unwrap();
    let names: Vec<&str> = page.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["carol", "bob"]);
    let rest = repo.find_page(2, 2, SortField::Username).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(repo.count_all().await.unwrap(), 3);

    assert!(repo.deactivate(alice.id, Utc::now()).await.unwrap());
    assert!(!repo.deactivate(9_999, Utc::now()).await.unwrap());
    assert_eq!(repo.count_active().await.unwrap(), 1);

    assert!(repo.delete(bob.id).await.unwrap());
    assert!(!repo.delete(bob.id).await.unwrap());
    assert!(repo.find_by_id(bob.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
async fn test_orm_backend_against_postgres(pool: PgPool) {
    exercise(Arc::new(OrmUserRepository::new(pool)), DataSource::Orm).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
async fn test_mapper_backend_against_postgres(pool: PgPool) {
    exercise(Arc::new(MapperUserRepository::new(pool)), DataSource::Mapper).await;
}
