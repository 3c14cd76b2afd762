use std::{collections::HashMap, time::Duration};

use backoffice_engine::{
    db_types::{SalesUpdate, TokenSubject, User},
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    AuthApi,
    AuthApiError,
    AuthManagement,
    ProductApi,
    SalesApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct BackofficeWorld {
    pub system: Option<BackofficeSystem>,
    /// What each named session's access token would assert about its bearer
    pub sessions: HashMap<String, TokenSubject>,
    pub last_auth_result: Option<Result<User, AuthApiError>>,
    pub last_sales_update: Option<SalesUpdate>,
}

#[derive(Debug)]
pub struct BackofficeSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub auth: AuthApi<SqliteDatabase>,
    pub products: ProductApi<SqliteDatabase>,
    pub sales: SalesApi<SqliteDatabase>,
}

impl BackofficeWorld {
    pub fn system(&self) -> &BackofficeSystem {
        self.system.as_ref().expect("Back-office system not initialised")
    }

    pub fn auth(&self) -> &AuthApi<SqliteDatabase> {
        &self.system().auth
    }

    pub async fn user_by_email(&self, email: &str) -> User {
        self.system()
            .db
            .fetch_user_by_email(email)
            .await
            .expect("Error fetching user")
            .unwrap_or_else(|| panic!("No user with email {email}"))
    }

    pub fn remember_session(&mut self, name: String, user: &User) {
        let subject = TokenSubject {
            user_id: user.id,
            email: user.email.clone(),
            password_change_epoch: user.password_epoch(),
        };
        self.sessions.insert(name, subject);
    }

    pub fn session(&self, name: &str) -> &TokenSubject {
        self.sessions.get(name).unwrap_or_else(|| panic!("No session named {name}"))
    }
}

impl BackofficeSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let auth = AuthApi::new(db.clone()).with_login_throttle(Duration::ZERO);
        let products = ProductApi::new(db.clone());
        let sales = SalesApi::new(db.clone());
        Self { db_path: url, db, auth, products, sales }
    }

    pub fn set_login_throttle(&mut self, throttle: Duration) {
        self.auth = AuthApi::new(self.db.clone()).with_login_throttle(throttle);
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
