// PostgreSQL store tests. They need a reachable database and are skipped
// when DATABASE_URL is not set.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use tijdkaart_api::config::DatabaseConfig;
use tijdkaart_api::database::models::{NewProject, NewTimeEntry, NewTripEntry, NewUser, TripFields};
use tijdkaart_api::database::{
    DatabaseError, DatabaseManager, PgStore, ProjectRepository, Store, TimeEntryRepository, TripEntryRepository,
    UserRepository,
};

async fn connect() -> Result<Option<PgStore>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
        return Ok(None);
    };
    let config = DatabaseConfig {
        url: Some(url),
        max_connections: 5,
        connection_timeout: 10,
    };
    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(PgStore::new(pool)))
}

fn whole_second_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap()
}

async fn new_user(store: &PgStore) -> Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    store
        .create_user(NewUser {
            id: id.clone(),
            email: format!("pg-{}@example.com", uuid::Uuid::new_v4().simple()),
            password_hash: "not-a-real-hash".to_string(),
            created_at: whole_second_now(),
        })
        .await?;
    Ok(id)
}

async fn new_project(store: &PgStore, owner: &str) -> Result<i32> {
    let project = store
        .insert_project(NewProject {
            name: "Test".to_string(),
            client_name: Some("ACME".to_string()),
            hourly_rate: Decimal::new(8550, 2),
            owner_user_id: owner.to_string(),
        })
        .await?;
    Ok(project.id)
}

fn entry(project_id: i32, owner: &str, start_time: DateTime<Utc>) -> NewTimeEntry {
    NewTimeEntry {
        project_id,
        owner_user_id: owner.to_string(),
        start_time,
        description: Some("werk".to_string()),
    }
}

#[tokio::test]
async fn health_check_passes() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    store.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn time_entry_view_joins_project_name() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let owner = new_user(&store).await?;
    let project_id = new_project(&store, &owner).await?;

    let start = whole_second_now() - Duration::hours(1);
    let view = store.insert_time_entry(entry(project_id, &owner, start)).await?;
    assert_eq!(view.project_name, "Test");
    assert_eq!(view.entry.start_time, start);
    assert!(view.entry.end_time.is_none());
    assert_eq!(view.entry.duration_minutes, 0);

    let found = store.find_time_entry(view.entry.id).await?.expect("entry exists");
    assert_eq!(found, view);

    let project = store.find_project(project_id).await?.expect("project exists");
    assert_eq!(project.hourly_rate, Decimal::new(8550, 2));
    assert!(project.is_active);
    Ok(())
}

#[tokio::test]
async fn close_only_succeeds_once() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let owner = new_user(&store).await?;
    let project_id = new_project(&store, &owner).await?;
    let start = whole_second_now() - Duration::minutes(90);
    let id = store.insert_time_entry(entry(project_id, &owner, start)).await?.entry.id;

    let end = start + Duration::minutes(90);
    let closed = store.close_time_entry(id, end, 90).await?.expect("first close wins");
    assert_eq!(closed.entry.end_time, Some(end));
    assert_eq!(closed.entry.duration_minutes, 90);
    assert_eq!(closed.project_name, "Test");

    let again = store.close_time_entry(id, end + Duration::minutes(5), 95).await?;
    assert!(again.is_none());

    let stored = store.find_time_entry(id).await?.expect("entry exists");
    assert_eq!(stored.entry.duration_minutes, 90);
    Ok(())
}

#[tokio::test]
async fn concurrent_closes_have_one_winner() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let owner = new_user(&store).await?;
    let project_id = new_project(&store, &owner).await?;
    let start = whole_second_now() - Duration::minutes(30);
    let id = store.insert_time_entry(entry(project_id, &owner, start)).await?.entry.id;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.close_time_entry(id, start + Duration::minutes(30 + i), 30 + i as i32).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await??.is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    Ok(())
}

#[tokio::test]
async fn lists_are_owner_scoped_newest_first() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let alice = new_user(&store).await?;
    let bob = new_user(&store).await?;
    let first = new_project(&store, &alice).await?;
    let second = new_project(&store, &alice).await?;
    let base = whole_second_now() - Duration::days(1);

    let older = store.insert_time_entry(entry(first, &alice, base)).await?.entry.id;
    let newer = store.insert_time_entry(entry(second, &alice, base + Duration::hours(2))).await?.entry.id;
    store.insert_time_entry(entry(first, &bob, base + Duration::hours(4))).await?;

    let all: Vec<i32> = store.list_time_entries(&alice, None).await?.iter().map(|v| v.entry.id).collect();
    assert_eq!(all, vec![newer, older]);

    let filtered: Vec<i32> = store
        .list_time_entries(&alice, Some(first))
        .await?
        .iter()
        .map(|v| v.entry.id)
        .collect();
    assert_eq!(filtered, vec![older]);

    let projects = store.list_projects_for_owner(&alice).await?;
    assert_eq!(projects.iter().map(|p| p.id).collect::<Vec<_>>(), vec![first, second]);
    Ok(())
}

#[tokio::test]
async fn deleting_project_cascades_and_detaches_trips() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let owner = new_user(&store).await?;
    let project_id = new_project(&store, &owner).await?;
    let entry_id = store
        .insert_time_entry(entry(project_id, &owner, whole_second_now()))
        .await?
        .entry
        .id;
    let trip = store
        .insert_trip(NewTripEntry {
            owner_user_id: owner.clone(),
            fields: TripFields {
                project_id: Some(project_id),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                start_address: "Stationsplein 1, Utrecht".to_string(),
                end_address: "Dam 1, Amsterdam".to_string(),
                distance_km: Decimal::new(425, 1),
                purpose: None,
            },
        })
        .await?;

    assert!(store.delete_project(project_id).await?);
    assert!(!store.delete_project(project_id).await?);

    assert!(store.find_time_entry(entry_id).await?.is_none());
    let trip = store.find_trip(trip.id).await?.expect("trip survives");
    assert_eq!(trip.project_id, None);
    assert_eq!(trip.distance_km, Decimal::new(425, 1));
    Ok(())
}

#[tokio::test]
async fn constraint_violations_are_classified() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let owner = new_user(&store).await?;

    let err = store
        .insert_time_entry(entry(i32::MAX, &owner, whole_second_now()))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));

    let email = format!("dup-{}@example.com", uuid::Uuid::new_v4().simple());
    let user = |id: String| NewUser {
        id,
        email: email.clone(),
        password_hash: "not-a-real-hash".to_string(),
        created_at: whole_second_now(),
    };
    store.create_user(user(uuid::Uuid::new_v4().to_string())).await?;
    let err = store.create_user(user(uuid::Uuid::new_v4().to_string())).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    Ok(())
}
