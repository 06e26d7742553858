use chrono::TimeDelta;

use rsvp_db::db::enums::AuthProvider;
use rsvp_db::db::query::user::{self as query, UserFilter};
use rsvp_service::error::ServiceError;
use rsvp_service::event;
use rsvp_service::user::{self, NOT_ALLOWED_PROVIDER};

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn alphabetical_orders_by_last_then_first_name() {
    let mut conn = connect().await;
    let users = UserScenario::create(&mut conn).await.unwrap();

    let listed = user::list_users(&mut conn, UserFilter::new().alphabetical())
        .await
        .unwrap();
    let names: Vec<_> = only(listed, &users.ids(), |u| u.id)
        .iter()
        .map(|u| u.first_name.clone())
        .collect();

    assert_eq!(names, ["Mike", "Alex", "Ryan"]);
}

#[test_log::test(tokio::test)]
async fn expired_and_active_partition_users() {
    let mut conn = connect().await;
    let users = UserScenario::create(&mut conn).await.unwrap();

    let expired = user::list_users(&mut conn, UserFilter::new().expired(users.now))
        .await
        .unwrap();
    let active = user::list_users(&mut conn, UserFilter::new().session_active(users.now))
        .await
        .unwrap();

    let expired = only(expired, &users.ids(), |u| u.id);
    let active = only(active, &users.ids(), |u| u.id);

    assert_eq!(expired, [users.ryan.clone()]);
    assert_eq!(active.len(), 2);
    assert!(active.contains(&users.alex));
    assert!(active.contains(&users.mike));
    assert!(!active.contains(&users.ryan));
}

#[test_log::test(tokio::test)]
async fn expiry_at_now_counts_as_expired() {
    let mut conn = connect().await;
    let now = fixed_now();
    let boundary = sign_in(&mut conn, "Tie", "Breaker", now).await.unwrap();

    let expired = user::list_users(&mut conn, UserFilter::new().expired(now))
        .await
        .unwrap();
    let active = user::list_users(&mut conn, UserFilter::new().session_active(now))
        .await
        .unwrap();

    assert_eq!(only(expired, &[boundary.id], |u| u.id).len(), 1);
    assert!(only(active, &[boundary.id], |u| u.id).is_empty());
}

#[test_log::test(tokio::test)]
async fn upsert_is_idempotent_on_identity() {
    let mut conn = connect().await;
    let now = fixed_now();
    let first = profile("Alex", "Egan", now + TimeDelta::days(120));

    let created = user::upsert_from_external_auth(&mut conn, &first)
        .await
        .unwrap();
    let before = query::count_users(&mut conn).await.unwrap();

    let renamed = rsvp_service::user::ExternalProfile {
        first_name: "Alexander".to_string(),
        token: "refreshed-token".to_string(),
        expires_at: now + TimeDelta::days(180),
        ..first.clone()
    };
    let updated = user::upsert_from_external_auth(&mut conn, &renamed)
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.first_name, "Alexander");
    assert_eq!(updated.oauth_token, "refreshed-token");
    assert_eq!(updated.oauth_expires_at, now + TimeDelta::days(180));
    assert_eq!(query::count_users(&mut conn).await.unwrap(), before);

    let stored = query::find_by_identity(&mut conn, AuthProvider::Facebook, &first.uid)
        .await
        .unwrap()
        .expect("user stored under its identity");
    assert_eq!(stored, updated);
}

#[test_log::test(tokio::test)]
async fn invalid_provider_writes_nothing() {
    let mut conn = connect().await;
    let before = query::count_users(&mut conn).await.unwrap();

    let twitter = rsvp_service::user::ExternalProfile {
        provider: "twitter".to_string(),
        ..profile("Alex", "Egan", fixed_now())
    };
    let errors = validation_error(user::upsert_from_external_auth(&mut conn, &twitter).await);

    assert_eq!(errors.messages_for("provider"), vec![NOT_ALLOWED_PROVIDER]);
    assert_eq!(query::count_users(&mut conn).await.unwrap(), before);
}

#[test_log::test(tokio::test)]
async fn missing_user_is_not_found() {
    let mut conn = connect().await;

    let result = user::get_user(&mut conn, i32::MAX).await;

    assert!(matches!(
        result,
        Err(ServiceError::NotFound { entity: "user", .. })
    ));
}

#[test_log::test(tokio::test)]
async fn attendees_are_listed_by_surname() {
    let mut conn = connect().await;
    let scenario = AttendanceScenario::create(&mut conn).await.unwrap();

    let attendees = event::attendees(&mut conn, scenario.events.halo.id)
        .await
        .unwrap();
    let names: Vec<_> = attendees.iter().map(rsvp_db::model::user::User::display_name).collect();

    assert_eq!(names, ["Tony Romo", "Dave Yan"]);

    let nobody = event::attendees(&mut conn, scenario.events.studying.id)
        .await
        .unwrap();
    assert!(nobody.is_empty());
}
