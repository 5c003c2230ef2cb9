use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use twogether::database::{ProfileRepository, SqliteProfileRepository};
use twogether::models::{Category, NewProfile};
use twogether::services::profile_list_service::ProfileListController;

async fn sqlite_repo() -> Arc<SqliteProfileRepository> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    Arc::new(SqliteProfileRepository::connect(pool).await.unwrap())
}

fn new_profile(first: &str, last: &str, image: &str, categories: Vec<Category>) -> NewProfile {
    NewProfile {
        first_name: first.to_string(),
        last_name: last.to_string(),
        role: "Consultant".to_string(),
        image_url: image.to_string(),
        categories,
    }
}

async fn wait_for(controller: &ProfileListController, expected: &[&str]) {
    let mut rx = controller.subscribe_visible();
    let result = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let names: Vec<String> = rx
                .borrow_and_update()
                .iter()
                .map(|p| p.first_name.clone())
                .collect();
            if names == expected {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await;
    assert!(result.is_ok(), "visible list never became {:?}", expected);
}

#[tokio::test]
async fn default_view_follows_own_categories_and_skips_missing_images() {
    let repo = sqlite_repo().await;
    repo.create_profile(new_profile("Ana", "Silva", "x", vec![Category::Technology]))
        .await
        .unwrap();
    repo.create_profile(new_profile("Bea", "Lima", "", vec![Category::Technology]))
        .await
        .unwrap();
    repo.create_profile(new_profile("Caio", "Reis", "z", vec![Category::Finance]))
        .await
        .unwrap();

    let controller = ProfileListController::new(repo.clone());
    let subscription = controller.start();

    let me = controller
        .create_profile(new_profile("Me", "Self", "", vec![Category::Technology]))
        .await
        .unwrap();
    assert_eq!(controller.current_profile_id(), Some(me));
    assert!(controller.load_primary_categories().await);

    wait_for(&controller, &["Ana"]).await;

    controller.set_search_text("an");
    wait_for(&controller, &["Ana"]).await;

    controller.set_search_text("");
    controller.toggle_category("FINANCE");
    wait_for(&controller, &["Caio"]).await;

    subscription.abort();
}

#[tokio::test]
async fn category_update_flows_back_through_subscription() {
    let repo = sqlite_repo().await;
    let controller = ProfileListController::new(repo.clone());
    let subscription = controller.start();

    assert!(!controller.update_profile_categories(&[Category::Design]).await);

    controller
        .create_profile(new_profile("Me", "Self", "https://img/me.png", vec![]))
        .await
        .unwrap();
    controller.toggle_category("DESIGN");
    wait_for(&controller, &[]).await;

    assert!(controller.update_profile_categories(&[Category::Design]).await);
    wait_for(&controller, &["Me"]).await;

    assert!(controller.load_primary_categories().await);
    assert_eq!(controller.primary_categories(), vec!["#Design".to_string()]);

    subscription.abort();
}
