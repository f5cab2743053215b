//! Integration tests for the customers table.
//!
//! Each test gets its own migrated database via `#[sqlx::test]`.

use leadsdb_db::{
    append_note, delete_customer, get_customer, insert_customer, is_unique_violation,
    list_customers, phone_exists, record_contact, set_status, update_customer, CustomerFilter,
    NewCustomer, UpdateCustomer,
};

fn sample_customer<'a>(name: &'a str, phone: Option<&'a str>) -> NewCustomer<'a> {
    NewCustomer {
        name,
        phone_number: phone,
        country: "iran",
        category: "cafe",
        source: "crawl",
        ..NewCustomer::default()
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn insert_and_get_round_trip(pool: sqlx::PgPool) {
    let created = insert_customer(&pool, &sample_customer("Cafe Naderi", Some("+98211")))
        .await
        .expect("insert");

    assert_eq!(created.name, "Cafe Naderi");
    assert_eq!(created.status, "new", "new customers start at status=new");
    assert_eq!(created.source, "crawl");
    assert_eq!(created.notes, serde_json::json!([]));

    let fetched = get_customer(&pool, created.public_id)
        .await
        .expect("get")
        .expect("customer exists");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.phone_number.as_deref(), Some("+98211"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_phone_is_a_unique_violation(pool: sqlx::PgPool) {
    insert_customer(&pool, &sample_customer("First", Some("+98225")))
        .await
        .expect("first insert");

    let result = insert_customer(&pool, &sample_customer("Second", Some("+98225"))).await;
    let err = result.expect_err("second insert with same phone should fail");
    assert!(
        is_unique_violation(&err),
        "expected unique violation, got: {err:?}"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn customers_without_phone_never_conflict(pool: sqlx::PgPool) {
    insert_customer(&pool, &sample_customer("No Phone A", None))
        .await
        .expect("insert A");
    insert_customer(&pool, &sample_customer("No Phone B", None))
        .await
        .expect("insert B");

    assert!(!phone_exists(&pool, "+000").await.expect("phone_exists"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn phone_exists_detects_saved_numbers(pool: sqlx::PgPool) {
    insert_customer(&pool, &sample_customer("Known", Some("+98333")))
        .await
        .expect("insert");

    assert!(phone_exists(&pool, "+98333").await.expect("phone_exists"));
    assert!(!phone_exists(&pool, "+98334").await.expect("phone_exists"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_filters_by_status_and_search(pool: sqlx::PgPool) {
    let a = insert_customer(&pool, &sample_customer("Alpha Cafe", Some("+1")))
        .await
        .expect("insert a");
    insert_customer(&pool, &sample_customer("Beta Restaurant", Some("+2")))
        .await
        .expect("insert b");

    set_status(&pool, a.public_id, "contacted")
        .await
        .expect("set_status");

    let (rows, total) = list_customers(
        &pool,
        &CustomerFilter {
            status: Some("contacted".to_string()),
            limit: 50,
            ..CustomerFilter::default()
        },
    )
    .await
    .expect("list by status");
    assert_eq!(total, 1);
    assert_eq!(rows[0].name, "Alpha Cafe");

    let (rows, total) = list_customers(
        &pool,
        &CustomerFilter {
            search: Some("beta".to_string()),
            limit: 50,
            ..CustomerFilter::default()
        },
    )
    .await
    .expect("list by search");
    assert_eq!(total, 1);
    assert_eq!(rows[0].name, "Beta Restaurant");

    let (rows, total) = list_customers(
        &pool,
        &CustomerFilter {
            limit: 1,
            ..CustomerFilter::default()
        },
    )
    .await
    .expect("list page");
    assert_eq!(total, 2, "total counts all matches beyond the page");
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn sparse_update_keeps_unset_fields(pool: sqlx::PgPool) {
    let created = insert_customer(&pool, &sample_customer("Original", Some("+98444")))
        .await
        .expect("insert");

    let updated = update_customer(
        &pool,
        created.public_id,
        &UpdateCustomer {
            name: Some("Renamed"),
            category: Some("restaurant"),
            ..UpdateCustomer::default()
        },
    )
    .await
    .expect("update")
    .expect("row exists");

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.category, "restaurant");
    assert_eq!(
        updated.phone_number.as_deref(),
        Some("+98444"),
        "unset fields keep their values"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn notes_and_contacts_are_append_only(pool: sqlx::PgPool) {
    let created = insert_customer(&pool, &sample_customer("Noted", Some("+98555")))
        .await
        .expect("insert");
    assert!(created.last_contacted_at.is_none());

    append_note(&pool, created.public_id, "called, call back tomorrow")
        .await
        .expect("append first note");
    let row = append_note(&pool, created.public_id, "sent catalogue")
        .await
        .expect("append second note")
        .expect("row exists");

    let notes = row.notes.as_array().expect("notes array");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["text"], "called, call back tomorrow");

    let row = record_contact(&pool, created.public_id, "phone", Some("intro call"))
        .await
        .expect("record contact")
        .expect("row exists");
    let history = row.contact_history.as_array().expect("history array");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["method"], "phone");
    assert!(
        row.last_contacted_at.is_some(),
        "recording a contact stamps last_contacted_at"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_removes_the_row(pool: sqlx::PgPool) {
    let created = insert_customer(&pool, &sample_customer("Doomed", Some("+98666")))
        .await
        .expect("insert");

    assert!(delete_customer(&pool, created.public_id)
        .await
        .expect("delete"));
    assert!(get_customer(&pool, created.public_id)
        .await
        .expect("get")
        .is_none());
    assert!(
        !delete_customer(&pool, created.public_id)
            .await
            .expect("second delete"),
        "deleting a missing row reports false"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_on_unknown_id_returns_none(pool: sqlx::PgPool) {
    let missing = uuid::Uuid::new_v4();
    let result = update_customer(
        &pool,
        missing,
        &UpdateCustomer {
            name: Some("Ghost"),
            ..UpdateCustomer::default()
        },
    )
    .await
    .expect("update");
    assert!(result.is_none());
}
