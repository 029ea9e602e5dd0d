use atlas_core::error::AppError;
use atlas_core::models::{Country, PersonDraft};
use atlas_core::traits::{CountryStore, PersonStore};
use chrono::NaiveDate;

use crate::common::setup_test_db;

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn insert_and_list_countries() {
    let (db, _container) = setup_test_db().await;
    let repo = db.country_repo();

    repo.insert(&Country::new("Spain", "ES")).await.unwrap();
    repo.insert(&Country::new("France", "FR").with_population(68_000_000))
        .await
        .unwrap();

    let countries = repo.list().await.unwrap();
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].name, "France");
    assert_eq!(countries[0].population, Some(68_000_000));
    assert_eq!(countries[1].name, "Spain");
}

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn duplicate_country_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let repo = db.country_repo();

    repo.insert(&Country::new("France", "FR")).await.unwrap();
    let err = repo.insert(&Country::new("France", "FX")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn rename_country_moves_persons() {
    let (db, _container) = setup_test_db().await;
    let countries = db.country_repo();
    let persons = db.person_repo();

    countries.insert(&Country::new("Burma", "MM")).await.unwrap();
    let person = persons
        .insert(&PersonDraft::new("Aung", "San", "Burma"))
        .await
        .unwrap();

    let renamed = countries
        .update("Burma", &Country::new("Myanmar", "MM"))
        .await
        .unwrap()
        .expect("country should exist");
    assert_eq!(renamed.name, "Myanmar");

    let person = persons.get(person.id).await.unwrap().unwrap();
    assert_eq!(person.country, "Myanmar");
}

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn delete_referenced_country_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let countries = db.country_repo();
    let persons = db.person_repo();

    countries.insert(&Country::new("England", "GB")).await.unwrap();
    persons
        .insert(&PersonDraft::new("Ada", "Lovelace", "England"))
        .await
        .unwrap();

    let err = countries.delete("England").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(!countries.delete("Atlantis").await.unwrap());
}

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn person_round_trip() {
    let (db, _container) = setup_test_db().await;
    let repo = db.person_repo();
    let born = NaiveDate::from_ymd_opt(1906, 12, 9).unwrap();

    let created = repo
        .insert(
            &PersonDraft::new("Grace", "Hopper", "USA")
                .with_email("grace@example.com")
                .with_birth_date(born),
        )
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.birth_date, Some(born));

    let updated = repo
        .update(created.id, &PersonDraft::new("Grace", "Murray Hopper", "USA"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.last_name, "Murray Hopper");
    assert_eq!(updated.email, None);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get(created.id).await.unwrap().is_none());
    assert!(repo.update(created.id, &PersonDraft::new("a", "b", "c")).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn health_check_succeeds() {
    let (db, _container) = setup_test_db().await;
    db.health_check().await.unwrap();
}

#[tokio::test]
#[ignore = "needs Docker for the PostgreSQL container"]
async fn over_long_code_is_validation_error() {
    let (db, _container) = setup_test_db().await;
    let repo = db.country_repo();

    let err = repo
        .insert(&Country::new("Freedonia", "FREEDONIA-CODE-17"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("too long")));
    assert!(repo.list().await.unwrap().is_empty());
}
