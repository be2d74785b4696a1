//! Registration, login and profile use cases.
//!
//! Plaintext passwords only live on the stack of these functions: they are hashed on a blocking
//! thread before anything is stored and are never logged.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    api::models::users::CurrentUser,
    auth::{
        password::{self, Argon2Params},
        session,
    },
    config::Config,
    db::{
        errors::DbError,
        handlers::UserStore,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    service::kits::KitService,
    types::UserId,
};

/// Registration input, already deserialized from the request body
pub struct Registration<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub kit_code: &'a str,
}

/// A successful login: the user and a freshly signed session token
pub struct LoginOutcome {
    pub user: UserDBResponse,
    pub token: String,
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    kits: KitService,
    config: Config,
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument {
            message: format!("{field} is required"),
        });
    }
    Ok(value.to_string())
}

/// Lowercase and check the basic `local@domain.tld` shape.
fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(Error::InvalidArgument {
            message: "email must be a valid email address".to_string(),
        });
    }
    Ok(email)
}

fn user_not_found(id: impl ToString) -> Error {
    Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    }
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, kits: KitService, config: Config) -> Self {
        Self { users, kits, config }
    }

    fn check_password_length(&self, password: &str) -> Result<()> {
        let rules = &self.config.auth.password;
        let length = password.chars().count();
        if length < rules.min_length || length > rules.max_length {
            return Err(Error::InvalidArgument {
                message: format!(
                    "password must be between {} and {} characters",
                    rules.min_length, rules.max_length
                ),
            });
        }
        Ok(())
    }

    /// Create an account. The kit code must be unclaimed and the email unused, checked in that
    /// order. No kit is created.
    #[instrument(skip_all, fields(email = %registration.email), err)]
    pub async fn register(&self, registration: Registration<'_>) -> Result<UserDBResponse> {
        let first_name = required("first_name", registration.first_name)?;
        let last_name = required("last_name", registration.last_name)?;
        let email = normalize_email(registration.email)?;
        self.check_password_length(registration.password)?;
        let kit_code = required("kit_code", registration.kit_code)?;

        if self.kits.code_exists(&kit_code).await? {
            return Err(Error::KitCodeExists);
        }

        let email_taken = self
            .users
            .email_exists(&email)
            .await
            .map_err(|err| Error::from_store(err, "check email"))?;
        if email_taken {
            return Err(Error::EmailExists);
        }

        let params = Argon2Params::from(&self.config.auth.password);
        let plaintext = registration.password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&plaintext, params))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password hashing task: {e}"),
            })??;

        let request = UserCreateDBRequest {
            email,
            password_hash,
            first_name,
            last_name,
        };
        let user = self.users.create(&request).await.map_err(|err| match err {
            // Lost a race with a concurrent registration
            DbError::UniqueViolation { .. } => Error::EmailExists,
            other => Error::from_store(other, "create user"),
        })?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Check credentials and issue a session token.
    #[instrument(skip_all, fields(email = %email), err)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(Error::InvalidArgument {
                message: "password is required".to_string(),
            });
        }

        let user = self
            .users
            .get_by_email(&email)
            .await
            .map_err(|err| Error::from_store(err, "look up user"))?
            .ok_or_else(|| user_not_found(&email))?;

        let plaintext = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || password::verify_string(&plaintext, &stored_hash))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })??;
        if !matches {
            return Err(Error::InvalidCredentials);
        }

        let current_user = CurrentUser {
            id: user.id,
            email: user.email.clone(),
        };
        let token = session::create_session_token(&current_user, &self.config)?;

        Ok(LoginOutcome { user, token })
    }

    #[instrument(skip(self), err)]
    pub async fn get_user(&self, id: UserId) -> Result<UserDBResponse> {
        self.users
            .get_by_id(id)
            .await
            .map_err(|err| Error::from_store(err, "get user"))?
            .ok_or_else(|| user_not_found(id))
    }

    #[instrument(skip(self, first_name, last_name), err)]
    pub async fn update_profile(&self, id: UserId, first_name: &str, last_name: &str) -> Result<UserDBResponse> {
        let request = UserUpdateDBRequest {
            first_name: required("first_name", first_name)?,
            last_name: required("last_name", last_name)?,
        };

        self.users.update(id, &request).await.map_err(|err| match err {
            DbError::NotFound => user_not_found(id),
            other => Error::from_store(other, "update user"),
        })
    }

    /// Token lifetime in seconds, as reported to clients
    pub fn token_lifetime_secs(&self) -> u64 {
        self.config.auth.security.jwt_expiry.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::KitStore, in_memory::InMemoryStore};

    fn test_config() -> Config {
        let mut config = Config {
            secret_key: Some("identity-test-secret".to_string()),
            ..Default::default()
        };
        // Cheap hashing for tests
        config.auth.password.argon2_memory_kib = 1024;
        config.auth.password.argon2_iterations = 1;
        config
    }

    fn service(store: &InMemoryStore) -> IdentityService {
        let kits = KitService::new(Arc::new(store.clone()));
        IdentityService::new(Arc::new(store.clone()), kits, test_config())
    }

    fn registration<'a>(email: &'a str, password: &'a str, kit_code: &'a str) -> Registration<'a> {
        Registration {
            first_name: "Ada",
            last_name: "Lovelace",
            email,
            password,
            kit_code,
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_register_then_login() {
        let store = InMemoryStore::new();
        let identity = service(&store);

        let user = identity
            .register(registration("Ada@Example.com", "correct-horse", "ABC123"))
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "correct-horse");

        let outcome = identity.login("ada@example.com", "correct-horse").await.unwrap();
        assert_eq!(outcome.user.id, user.id);

        let claims = session::verify_session_token(&outcome.token, &test_config()).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_claimed_kit_code_blocks_second_registration() {
        let store = InMemoryStore::new();
        let identity = service(&store);

        let first = identity.register(registration("a@b.com", "password1", "ABC123")).await.unwrap();
        // Registration does not create the kit; the first user claims it through the registry
        KitStore::create(
            &store,
            &crate::db::models::kits::KitCreateDBRequest {
                owner_user_id: first.id,
                name: "ABC123".to_string(),
                description: "balcony".to_string(),
            },
        )
        .await
        .unwrap();

        let err = identity
            .register(registration("c@d.com", "password2", "ABC123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::KitCodeExists));
        assert!(UserStore::get_by_email(&store, "c@d.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_kit_code_is_checked_before_email() {
        let store = InMemoryStore::new();
        let identity = service(&store);

        let first = identity.register(registration("a@b.com", "password1", "KIT-1")).await.unwrap();
        KitStore::create(
            &store,
            &crate::db::models::kits::KitCreateDBRequest {
                owner_user_id: first.id,
                name: "KIT-1".to_string(),
                description: "claimed".to_string(),
            },
        )
        .await
        .unwrap();

        // Both conditions fail; the kit code wins
        let err = identity.register(registration("a@b.com", "password1", "KIT-1")).await.unwrap_err();
        assert!(matches!(err, Error::KitCodeExists));

        let err = identity.register(registration("A@B.com", "password1", "KIT-2")).await.unwrap_err();
        assert!(matches!(err, Error::EmailExists));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials_not_not_found() {
        let store = InMemoryStore::new();
        let identity = service(&store);
        identity.register(registration("a@b.com", "right-password", "XYZ")).await.unwrap();

        assert!(matches!(identity.login("a@b.com", "wrong").await, Err(Error::InvalidCredentials)));
        assert!(matches!(identity.login("nobody@b.com", "wrong").await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_register_shape_validation() {
        let store = InMemoryStore::new();
        let identity = service(&store);

        for (email, password, kit_code) in [
            ("not-an-email", "password1", "K1"),
            ("a@b", "password1", "K1"),
            ("a@b.com", "short", "K1"),
            ("a@b.com", "password1", "   "),
        ] {
            let err = identity.register(registration(email, password, kit_code)).await.unwrap_err();
            assert!(matches!(err, Error::InvalidArgument { .. }), "{email}/{kit_code}");
        }

        let err = identity
            .register(Registration {
                first_name: " ",
                ..registration("a@b.com", "password1", "K1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = InMemoryStore::new();
        let identity = service(&store);
        let user = identity.register(registration("a@b.com", "password1", "K1")).await.unwrap();

        let updated = identity.update_profile(user.id, "Grace", "Hopper").await.unwrap();
        assert_eq!((updated.first_name.as_str(), updated.last_name.as_str()), ("Grace", "Hopper"));
        assert_eq!(identity.get_user(user.id).await.unwrap().first_name, "Grace");

        let err = identity.update_profile(user.id + 1, "Grace", "Hopper").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(matches!(identity.get_user(user.id + 1).await, Err(Error::NotFound { .. })));
    }
}
