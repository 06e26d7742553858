use rsvp_db::db::query::attendance::{self as query, AttendanceFilter};
use rsvp_db::model::attendance::{Attendance, NewAttendance};
use rsvp_service::attendance::{
    self, ALREADY_RECORDED, AttendanceDraft, EVENT_INACTIVE, USER_UNKNOWN,
};
use rsvp_service::error::ServiceError;
use rsvp_service::event;

use super::helpers::*;

fn sorted_ids(attendances: &[Attendance]) -> Vec<i32> {
    let mut ids: Vec<_> = attendances.iter().map(|a| a.id).collect();
    ids.sort_unstable();
    ids
}

fn ids_of(attendances: &[&Attendance]) -> Vec<i32> {
    let mut ids: Vec<_> = attendances.iter().map(|a| a.id).collect();
    ids.sort_unstable();
    ids
}

#[test_log::test(tokio::test)]
async fn attendance_for_active_event_validates() {
    let mut conn = connect().await;
    let scenario = AttendanceScenario::create(&mut conn).await.unwrap();

    let stored = attendance::get_attendance(&mut conn, scenario.dave_uc.id)
        .await
        .unwrap();

    assert_eq!(stored.user_id, scenario.dave.id);
    assert_eq!(stored.event_id, scenario.events.bored_in_uc.id);
    assert!(stored.confirmed);
}

#[test_log::test(tokio::test)]
async fn for_user_and_for_event_scopes() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    let dave = attendance::list_attendances(&mut conn, AttendanceFilter::new().for_user(s.dave.id))
        .await
        .unwrap();
    let halo = attendance::list_attendances(
        &mut conn,
        AttendanceFilter::new().for_event(s.events.halo.id),
    )
    .await
    .unwrap();
    let alex = attendance::list_attendances(
        &mut conn,
        AttendanceFilter::new().for_user(s.events.alex.id),
    )
    .await
    .unwrap();

    assert_eq!(sorted_ids(&dave), ids_of(&[&s.dave_halo, &s.dave_uc]));
    assert_eq!(sorted_ids(&halo), ids_of(&[&s.dave_halo, &s.tony_halo]));
    assert!(alex.is_empty());
}

#[test_log::test(tokio::test)]
async fn confirmed_and_unconfirmed_scopes() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();
    let ids = [s.dave_halo.id, s.tony_halo.id, s.dave_uc.id, s.tony_uc.id];

    let confirmed = attendance::list_attendances(&mut conn, AttendanceFilter::new().confirmed())
        .await
        .unwrap();
    let unconfirmed =
        attendance::list_attendances(&mut conn, AttendanceFilter::new().unconfirmed())
            .await
            .unwrap();

    assert_eq!(
        sorted_ids(&only(confirmed, &ids, |a| a.id)),
        ids_of(&[&s.tony_halo, &s.dave_uc, &s.tony_uc])
    );
    assert_eq!(only(unconfirmed, &ids, |a| a.id), [s.dave_halo.clone()]);
}

#[test_log::test(tokio::test)]
async fn inactive_event_is_rejected() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    let draft = AttendanceDraft::new(s.dave.id, s.events.inactive.id, true);
    let errors = validation_error(attendance::create_attendance(&mut conn, draft).await);
    assert_eq!(errors.messages_for("event"), vec![EVENT_INACTIVE]);

    let missing = AttendanceDraft::new(s.dave.id, i32::MAX, true);
    let errors = validation_error(attendance::create_attendance(&mut conn, missing).await);
    assert_eq!(errors.messages_for("event"), vec![EVENT_INACTIVE]);
}

#[test_log::test(tokio::test)]
async fn unknown_user_is_rejected() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    let draft = AttendanceDraft::new(i32::MAX, s.events.halo.id, false);
    let errors = validation_error(attendance::create_attendance(&mut conn, draft).await);

    assert_eq!(errors.messages_for("user"), vec![USER_UNKNOWN]);
}

#[test_log::test(tokio::test)]
async fn confirming_after_deactivation_fails() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    event::set_event_active(&mut conn, s.events.halo.id, false)
        .await
        .unwrap();

    let errors = validation_error(attendance::set_confirmed(&mut conn, s.dave_halo.id, true).await);
    assert_eq!(errors.messages_for("event"), vec![EVENT_INACTIVE]);

    let unchanged = attendance::get_attendance(&mut conn, s.dave_halo.id)
        .await
        .unwrap();
    assert!(!unchanged.confirmed);
}

#[test_log::test(tokio::test)]
async fn set_confirmed_on_active_event() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    let confirmed = attendance::set_confirmed(&mut conn, s.dave_halo.id, true)
        .await
        .unwrap();

    assert!(confirmed.confirmed);
    assert_eq!(confirmed.id, s.dave_halo.id);
}

#[test_log::test(tokio::test)]
async fn withdrawing_deletes_the_attendance() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    attendance::delete_attendance(&mut conn, s.tony_uc.id)
        .await
        .unwrap();

    assert!(matches!(
        attendance::get_attendance(&mut conn, s.tony_uc.id).await,
        Err(ServiceError::NotFound {
            entity: "attendance",
            ..
        })
    ));

    // The pair is free again.
    let again = attend(&mut conn, &s.tony, &s.events.bored_in_uc, false)
        .await
        .unwrap();
    assert!(!again.confirmed);
}

#[test_log::test(tokio::test)]
async fn duplicate_pair_is_rejected() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    let draft = AttendanceDraft::new(s.dave.id, s.events.halo.id, true);
    let errors = validation_error(attendance::create_attendance(&mut conn, draft).await);
    assert_eq!(errors.messages_for("event"), vec![ALREADY_RECORDED]);

    // Moving an attendance onto a pair that is already taken fails the same way.
    let moved = AttendanceDraft::new(s.dave.id, s.events.halo.id, true);
    let errors = validation_error(attendance::update_attendance(&mut conn, s.dave_uc.id, moved).await);
    assert_eq!(errors.messages_for("event"), vec![ALREADY_RECORDED]);
}

#[test_log::test(tokio::test)]
async fn unique_index_backs_the_pair_check() {
    let mut conn = connect().await;
    let s = AttendanceScenario::create(&mut conn).await.unwrap();

    // Bypasses validation; the failure aborts the test transaction.
    let duplicate = NewAttendance {
        user_id: s.tony.id,
        event_id: s.events.halo.id,
        confirmed: false,
    };
    let error = query::create_attendance(&mut conn, &duplicate)
        .await
        .expect_err("unique index must refuse the duplicate");

    assert!(rsvp_db::error::DbError::from(error).is_unique_violation());
}
