use rsvp_app::seeder::{Seeder, category::CategorySeeder};
use rsvp_db::db::query::category as query;
use rsvp_service::category;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn seeding_creates_missing_and_reactivates_inactive() {
    let mut conn = connect().await;
    let dormant = create_category(&mut conn, "Studying", false).await.unwrap();
    let fresh = unique("Hanging Out");

    let seeder = CategorySeeder::new([fresh.as_str(), dormant.name.as_str()]);
    let written = seeder.seed(&mut conn).await.unwrap();
    assert_eq!(written, 2);

    let created = query::find_by_name(&mut conn, &fresh)
        .await
        .unwrap()
        .expect("seeded category exists");
    assert!(created.active);
    assert!(category::get_category(&mut conn, dormant.id).await.unwrap().active);

    // A second run finds everything in place.
    assert_eq!(seeder.seed(&mut conn).await.unwrap(), 0);
}
