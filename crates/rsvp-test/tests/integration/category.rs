use rsvp_core::validation::BLANK;
use rsvp_db::db::query::category::{self as query, CategoryFilter};
use rsvp_db::db::query::event::EventFilter;
use rsvp_service::category::{self, CategoryDraft, NAME_TAKEN};
use rsvp_service::error::ServiceError;
use rsvp_service::event::{self, CATEGORY_INACTIVE, EventDraft};

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn active_and_inactive_scopes() {
    let mut conn = connect().await;
    let chilling = create_category(&mut conn, "Hanging Out", true).await.unwrap();
    let studying = create_category(&mut conn, "Studying", true).await.unwrap();
    let nsfw = create_category(&mut conn, "NSFW", false).await.unwrap();
    let ids = [chilling.id, studying.id, nsfw.id];

    let active = category::list_categories(&mut conn, CategoryFilter::new().active())
        .await
        .unwrap();
    let inactive = category::list_categories(&mut conn, CategoryFilter::new().inactive())
        .await
        .unwrap();

    let active = only(active, &ids, |c| c.id);
    assert_eq!(active.len(), 2);
    assert!(active.contains(&chilling));
    assert!(active.contains(&studying));
    assert_eq!(only(inactive, &ids, |c| c.id), [nsfw]);
}

#[test_log::test(tokio::test)]
async fn alphabetical_orders_by_name() {
    let mut conn = connect().await;
    let studying = create_category(&mut conn, "Studying", true).await.unwrap();
    let chilling = create_category(&mut conn, "Hanging Out", true).await.unwrap();
    let nsfw = create_category(&mut conn, "NSFW", false).await.unwrap();

    let listed = category::list_categories(&mut conn, CategoryFilter::new().alphabetical())
        .await
        .unwrap();
    let ordered: Vec<_> = only(listed, &[studying.id, chilling.id, nsfw.id], |c| c.id)
        .into_iter()
        .map(|c| c.id)
        .collect();

    assert_eq!(ordered, [chilling.id, nsfw.id, studying.id]);
}

#[test_log::test(tokio::test)]
async fn name_must_be_unique_ignoring_case() {
    let mut conn = connect().await;
    let chilling = create_category(&mut conn, "Hanging Out", true).await.unwrap();

    let shouting = CategoryDraft::new(chilling.name.to_uppercase(), true);
    let errors = validation_error(category::create_category(&mut conn, &shouting).await);
    assert_eq!(errors.messages_for("name"), vec![NAME_TAKEN]);

    // Renaming a category to a case variant of its own name is fine.
    let renamed = category::update_category(&mut conn, chilling.id, &shouting)
        .await
        .unwrap();
    assert_eq!(renamed.name, chilling.name.to_uppercase());
}

#[test_log::test(tokio::test)]
async fn wildcards_in_a_name_match_only_themselves() {
    let mut conn = connect().await;
    let half_time = create_category(&mut conn, "Half_Time 100%", true).await.unwrap();

    let lookalike = half_time.name.replace('_', "X").replace('%', "0");
    assert!(!query::name_taken(&mut conn, &lookalike, None).await.unwrap());
    assert!(
        query::name_taken(&mut conn, &half_time.name.to_lowercase(), None)
            .await
            .unwrap()
    );

    let created = category::create_category(&mut conn, &CategoryDraft::new(lookalike.clone(), true))
        .await
        .unwrap();
    assert_eq!(created.name, lookalike);
}

#[test_log::test(tokio::test)]
async fn name_is_required() {
    let mut conn = connect().await;

    let draft = CategoryDraft {
        name: Some("  ".to_string()),
        active: Some(true),
    };
    let errors = validation_error(category::create_category(&mut conn, &draft).await);

    assert_eq!(errors.messages_for("name"), vec![BLANK]);
}

#[test_log::test(tokio::test)]
async fn updating_a_missing_category_is_not_found() {
    let mut conn = connect().await;

    let result =
        category::update_category(&mut conn, i32::MAX, &CategoryDraft::new("Ghost", true)).await;

    assert!(matches!(
        result,
        Err(ServiceError::NotFound {
            entity: "category",
            ..
        })
    ));
}

#[test_log::test(tokio::test)]
async fn deactivated_category_keeps_events_but_refuses_saves() {
    let mut conn = connect().await;
    let scenario = EventScenario::create(&mut conn).await.unwrap();

    let closed = category::set_category_active(&mut conn, scenario.hanging_out.id, false)
        .await
        .unwrap();
    assert!(!closed.active);

    let events = event::list_events(
        &mut conn,
        EventFilter::new().for_category(scenario.hanging_out.id),
    )
    .await
    .unwrap();
    assert_eq!(events.len(), 4);

    let draft = event_draft(
        &scenario.alex,
        &closed,
        "Late night",
        scenario.now,
        None,
    );
    let errors = validation_error(event::create_event(&mut conn, &scenario.ctx, &draft).await);
    assert_eq!(errors.messages_for("category"), vec![CATEGORY_INACTIVE]);

    let rename = EventDraft {
        name: Some("Still bored".to_string()),
        ..EventDraft::from(&scenario.bored_in_uc)
    };
    let errors =
        validation_error(event::update_event(&mut conn, scenario.bored_in_uc.id, &rename).await);
    assert_eq!(errors.messages_for("category"), vec![CATEGORY_INACTIVE]);
}
