use backoffice_engine::{
    db_types::{SalesLineItem, SalesOrder, SalesUpdate},
    AuthApiError,
};
use cucumber::{then, when};

use crate::cucumber::BackofficeWorld;

#[when(expr = "{string} logs in with password {string} as session {string}")]
async fn login_as_session(world: &mut BackofficeWorld, email: String, password: String, session: String) {
    let user = world.auth().login(&email, &password).await.expect("Login failed");
    world.remember_session(session, &user);
}

#[when(expr = "{string} changes password from {string} to {string} as session {string}")]
async fn change_password_as_session(
    world: &mut BackofficeWorld,
    email: String,
    current: String,
    new: String,
    session: String,
) {
    let user = world.user_by_email(&email).await;
    let user = world.auth().change_password(user.id, &current, &new).await.expect("Password change failed");
    world.remember_session(session, &user);
}

#[when(expr = "{string} tries to change password from {string} to {string}")]
async fn try_change_password(world: &mut BackofficeWorld, email: String, current: String, new: String) {
    let user = world.user_by_email(&email).await;
    let result = world.auth().change_password(user.id, &current, &new).await;
    world.last_auth_result = Some(result);
}

#[then(expr = "session {string} is accepted")]
async fn session_accepted(world: &mut BackofficeWorld, session: String) {
    let subject = world.session(&session).clone();
    let identity = world.auth().authenticate(&subject).await.expect("Session was rejected");
    assert_eq!(identity.user_id, subject.user_id);
    assert_eq!(identity.email, subject.email);
}

#[then(expr = "session {string} is rejected because it predates the password change")]
async fn session_superseded(world: &mut BackofficeWorld, session: String) {
    let subject = world.session(&session).clone();
    let err = world.auth().authenticate(&subject).await.expect_err("Session should have been rejected");
    assert!(matches!(err, AuthApiError::TokenSuperseded), "Unexpected error: {err}");
}

#[then(expr = "logging in as {string} with password {string} succeeds")]
async fn login_succeeds(world: &mut BackofficeWorld, email: String, password: String) {
    let user = world.auth().login(&email, &password).await.expect("Login failed");
    assert_eq!(user.email, email);
}

#[then(expr = "logging in as {string} with password {string} fails with invalid credentials")]
async fn login_fails(world: &mut BackofficeWorld, email: String, password: String) {
    let err = world.auth().login(&email, &password).await.expect_err("Login should have failed");
    assert!(matches!(err, AuthApiError::InvalidCredentials), "Unexpected error: {err}");
}

#[then(expr = "logging in as {string} with password {string} is throttled")]
async fn login_throttled(world: &mut BackofficeWorld, email: String, password: String) {
    let err = world.auth().login(&email, &password).await.expect_err("Login should have been throttled");
    match err {
        AuthApiError::TooManyAttempts(secs) => assert!((1..=5).contains(&secs), "Unexpected wait of {secs}s"),
        e => panic!("Unexpected error: {e}"),
    }
}

#[then("the password change fails because the current password is incorrect")]
async fn password_change_rejected(world: &mut BackofficeWorld) {
    match world.last_auth_result.take() {
        Some(Err(AuthApiError::IncorrectCurrentPassword)) => {},
        other => panic!("Unexpected result: {other:?}"),
    }
}

async fn pay_order(world: &mut BackofficeWorld, order_id: i64, delivery_id: Option<String>, items: &[(i64, i64)]) {
    let line_items = items.iter().map(|&(quantity, product_id)| SalesLineItem { product_id, quantity }).collect();
    let order = SalesOrder { order_id, delivery_id, line_items };
    let update = world.system().sales.record_sales(&order).await.expect("Error recording sales");
    world.last_sales_update = Some(update);
}

#[when(expr = "order {int} is paid with {int} of product {int}")]
async fn order_one_item(world: &mut BackofficeWorld, order_id: i64, qty: i64, product: i64) {
    pay_order(world, order_id, None, &[(qty, product)]).await;
}

#[when(expr = "order {int} is paid with {int} of product {int} and {int} of product {int}")]
async fn order_two_items(world: &mut BackofficeWorld, order_id: i64, q1: i64, p1: i64, q2: i64, p2: i64) {
    pay_order(world, order_id, None, &[(q1, p1), (q2, p2)]).await;
}

#[when(expr = "delivery {string} of order {int} is paid with {int} of product {int}")]
async fn delivery_one_item(world: &mut BackofficeWorld, delivery: String, order_id: i64, qty: i64, product: i64) {
    pay_order(world, order_id, Some(delivery), &[(qty, product)]).await;
}

#[then(expr = "product {int} has sold {int}")]
async fn product_sales(world: &mut BackofficeWorld, shopify_id: i64, sold: i64) {
    let products = world.system().products.all_products().await.expect("Error fetching products");
    let product = products.iter().find(|p| p.shopify_id == shopify_id).expect("Product not found");
    assert_eq!(product.sales_count, sold);
}

#[then(expr = "the last order updated {int} products and missed {int}")]
async fn last_order_counts(world: &mut BackofficeWorld, updated: usize, missed: usize) {
    assert_eq!(
        world.last_sales_update,
        Some(SalesUpdate::Applied { products_updated: updated, products_not_found: missed })
    );
}

#[then("the last delivery was ignored as a duplicate")]
async fn last_delivery_duplicate(world: &mut BackofficeWorld) {
    assert_eq!(world.last_sales_update, Some(SalesUpdate::DuplicateDelivery));
}

#[then(expr = "the bestsellers for {string} are {string}")]
async fn bestsellers(world: &mut BackofficeWorld, email: String, expected: String) {
    let user = world.user_by_email(&email).await;
    let products = world.system().products.bestsellers_for_user(user.id).await.expect("Error fetching bestsellers");
    let ids = products.iter().map(|p| p.shopify_id.to_string()).collect::<Vec<_>>().join(",");
    assert_eq!(ids, expected.replace(' ', ""));
}
