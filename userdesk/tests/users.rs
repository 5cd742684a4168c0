mod common;

use common::Harness;
use serde_json::Value;
use userdesk::UserOut;

#[tokio::test]
async fn created_user_reads_back_identically() {
    let h = Harness::start().await;

    let created: UserOut = h
        .app
        .post("/users")
        .form(&[
            ("name", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("phone", "+44 20 7946 0000"),
            ("address", "12 St James's Square"),
            ("age", "36"),
        ])
        .send()
        .await
        .assert_created()
        .json();

    assert!(created.id > 0);
    assert_eq!(created.age, Some(36));
    assert_eq!(created.profile_picture, None);

    let fetched: UserOut = h
        .app
        .get(&format!("/users/{}", created.id))
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn scenario_create_update_delete() {
    let h = Harness::start().await;

    let resp = h
        .app
        .post("/users")
        .form(&[("name", "A"), ("email", "a@x.com")])
        .send()
        .await
        .assert_created()
        .assert_json_path("email", "a@x.com")
        .assert_json_path("profile_picture", Value::Null);
    let id: i64 = resp.json_path("id");

    h.app
        .put(&format!("/users/{id}"))
        .form(&[("name", "A"), ("email", "b@x.com")])
        .send()
        .await
        .assert_ok()
        .assert_json_path("id", id);

    h.app
        .get(&format!("/users/{id}"))
        .send()
        .await
        .assert_ok()
        .assert_json_path("email", "b@x.com");

    h.app
        .delete(&format!("/users/{id}"))
        .send()
        .await
        .assert_ok()
        .assert_json_path("message", "User deleted");

    h.app
        .get(&format!("/users/{id}"))
        .send()
        .await
        .assert_not_found()
        .assert_json_path("error", format!("User {id} not found"));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let h = Harness::start().await;
    h.create(&[("name", "First"), ("email", "dup@example.com")]).await;

    h.app
        .post("/users")
        .form(&[("name", "Second"), ("email", "dup@example.com")])
        .send()
        .await
        .assert_conflict()
        .assert_json_path("error", "Email dup@example.com is already registered");

    assert_eq!(h.count().await, 1);
    h.app
        .get("/users")
        .send()
        .await
        .assert_json_path("[0].name", "First");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_creates_let_exactly_one_through() {
    let h = Harness::with(|s| s.max_connections = 5).await;

    for round in 0..3 {
        let email = format!("race{round}@example.com");
        let requests: Vec<_> = (0..6)
            .map(|n| {
                let name = format!("Racer {n}");
                tokio::spawn(
                    h.app
                        .post("/users")
                        .form(&[("name", name.as_str()), ("email", email.as_str())])
                        .send(),
                )
            })
            .collect();

        let mut statuses = Vec::with_capacity(requests.len());
        for request in requests {
            statuses.push(request.await.unwrap().status.as_u16());
        }
        statuses.sort_unstable();
        assert_eq!(statuses, [201, 409, 409, 409, 409, 409], "round {round}");
    }

    assert_eq!(h.count().await, 3);
}

#[tokio::test]
async fn updating_to_a_taken_email_is_a_conflict() {
    let h = Harness::start().await;
    h.create(&[("name", "A"), ("email", "a@example.com")]).await;
    let b = h.create(&[("name", "B"), ("email", "b@example.com")]).await;

    h.app
        .put(&format!("/users/{b}"))
        .form(&[("name", "B"), ("email", "a@example.com")])
        .send()
        .await
        .assert_conflict();

    h.app
        .get(&format!("/users/{b}"))
        .send()
        .await
        .assert_json_path("email", "b@example.com");
}

#[tokio::test]
async fn update_of_missing_user_creates_nothing() {
    let h = Harness::start().await;

    h.app
        .put("/users/42")
        .form(&[("name", "Ghost"), ("email", "ghost@example.com")])
        .send()
        .await
        .assert_not_found();

    assert_eq!(h.count().await, 0);
}

#[tokio::test]
async fn update_replaces_every_field() {
    let h = Harness::start().await;
    let id = h
        .create(&[
            ("name", "Grace"),
            ("email", "grace@example.com"),
            ("phone", "555-0100"),
            ("address", "Arlington"),
            ("age", "85"),
            ("profile_picture", "https://cdn.example.com/grace.png"),
        ])
        .await;

    h.app
        .put(&format!("/users/{id}"))
        .form(&[("name", "Grace Hopper"), ("email", "grace@example.com")])
        .send()
        .await
        .assert_ok()
        .assert_json_path("name", "Grace Hopper")
        .assert_json_path("phone", Value::Null)
        .assert_json_path("address", Value::Null)
        .assert_json_path("age", Value::Null)
        // No new picture keeps the stored one.
        .assert_json_path("profile_picture", "https://cdn.example.com/grace.png");
}

#[tokio::test]
async fn delete_of_missing_user_is_not_found() {
    let h = Harness::start().await;
    h.app.delete("/users/7").send().await.assert_not_found();
}

#[tokio::test]
async fn listing_an_empty_store_is_empty() {
    let h = Harness::start().await;
    h.app
        .get("/users?skip=0&limit=10")
        .send()
        .await
        .assert_ok()
        .assert_json_path("len()", 0);
}

#[tokio::test]
async fn listing_pages_in_insertion_order() {
    let h = Harness::start().await;
    for n in 0..12 {
        let email = format!("user{n}@example.com");
        let name = format!("user {n}");
        h.create(&[("name", name.as_str()), ("email", email.as_str())])
            .await;
    }

    // Defaults are skip=0, limit=10.
    h.app
        .get("/users")
        .send()
        .await
        .assert_ok()
        .assert_json_path("len()", 10)
        .assert_json_path("[0].email", "user0@example.com");

    h.app
        .get("/users?skip=10&limit=5")
        .send()
        .await
        .assert_ok()
        .assert_json_path("len()", 2)
        .assert_json_path("[0].email", "user10@example.com")
        .assert_json_path("[1].email", "user11@example.com");

    h.app
        .get("/users?skip=0&limit=0")
        .send()
        .await
        .assert_ok()
        .assert_json_path("len()", 0);

    h.app
        .get("/users?skip=100")
        .send()
        .await
        .assert_ok()
        .assert_json_path("len()", 0);
}

#[tokio::test]
async fn malformed_window_is_unprocessable() {
    let h = Harness::start().await;
    h.app
        .get("/users?skip=-1")
        .send()
        .await
        .assert_unprocessable()
        .assert_json_path("details[0].field", "query");
}

#[tokio::test]
async fn invalid_fields_are_unprocessable() {
    let h = Harness::start().await;

    h.app
        .post("/users")
        .form(&[("name", "Ada"), ("email", "not-an-email")])
        .send()
        .await
        .assert_unprocessable()
        .assert_json_path("error", "Validation failed")
        .assert_json_path("details[0].field", "email");

    h.app
        .post("/users")
        .form(&[("email", "ada@example.com")])
        .send()
        .await
        .assert_unprocessable()
        .assert_json_path("details[0].field", "name")
        .assert_json_path("details[0].code", "missing");

    h.app
        .post("/users")
        .form(&[("name", "  "), ("email", "ada@example.com")])
        .send()
        .await
        .assert_unprocessable()
        .assert_json_path("details[0].field", "name");

    h.app
        .post("/users")
        .form(&[("name", "Ada"), ("email", "ada@example.com"), ("age", "thirty")])
        .send()
        .await
        .assert_unprocessable()
        .assert_json_path("details[0].field", "age");

    assert_eq!(h.count().await, 0);
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let h = Harness::start().await;
    h.app.get("/users/abc").send().await.assert_bad_request();
}
