use std::time::Duration;

use cucumber::given;

use crate::cucumber::{backoffice_world::BackofficeSystem, BackofficeWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut BackofficeWorld) {
    let system = BackofficeSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a login throttle of {int} seconds")]
async fn login_throttle(world: &mut BackofficeWorld, secs: u64) {
    world.system.as_mut().expect("Back-office system not initialised").set_login_throttle(Duration::from_secs(secs));
}

#[given(expr = "a registered user {string} with email {string} and password {string}")]
async fn registered_user(world: &mut BackofficeWorld, name: String, email: String, password: String) {
    world.auth().register(&name, &email, &password).await.expect("Error registering user");
}

#[given(expr = "{string} has created products with Shopify ids {string}")]
async fn created_products(world: &mut BackofficeWorld, email: String, ids: String) {
    let user = world.user_by_email(&email).await;
    for id in ids.split(',') {
        let shopify_id = id.trim().parse::<i64>().expect("Not a valid Shopify id");
        world.system().products.register_product(shopify_id, user.id).await.expect("Error creating product");
    }
}
