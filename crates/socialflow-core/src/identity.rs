//! Registration, login and token resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_auth::{hash_password, validate_password, verify_password, AccessToken, AuthError, JwtService};
use socialflow_org::{normalize_email, Tenant, TenantSummary};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::user::User;
use crate::workspace::WorkspaceService;

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,

    /// Name of the first workspace; defaults to "<name>'s Workspace"
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Token plus the user it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: User,

    /// Set on registration only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub workspaces: Vec<TenantSummary>,
}

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
    workspaces: WorkspaceService,
    jwt: Arc<JwtService>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>, workspaces: WorkspaceService, jwt: Arc<JwtService>) -> Self {
        Self {
            store,
            workspaces,
            jwt,
        }
    }

    /// Create the user and their first workspace, then sign them in.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration, now: DateTime<Utc>) -> CoreResult<AuthSession> {
        let email = normalize_email(&registration.email);
        if !email.contains('@') {
            return Err(CoreError::invalid("a valid email address is required"));
        }
        let name = registration.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::invalid("name must not be empty"));
        }
        validate_password(&registration.password)?;

        let hash = hash_password(&registration.password)?;
        let user = User::new(&email, name, hash, now);
        self.store.insert_user(user.clone()).await?;

        let workspace_name = registration
            .company_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{}'s Workspace", user.name));
        let tenant = self.workspaces.create_tenant(&user, &workspace_name, now).await?;

        info!(user_id = %user.id, tenant_id = %tenant.id, "User registered");
        let token = self.jwt.issue(user.id, &user.email, &user.name)?;
        Ok(AuthSession {
            token,
            user,
            tenant: Some(tenant),
        })
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<AuthSession> {
        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };
        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.jwt.issue(user.id, &user.email, &user.name)?;
        Ok(AuthSession {
            token,
            user,
            tenant: None,
        })
    }

    /// Resolve a bearer token to a stored user.
    pub async fn authenticate(&self, token: &str) -> CoreResult<User> {
        let claims = self.jwt.validate_token(token)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AuthError::InvalidToken("subject is not a user id".to_string()))?;
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("unknown user".to_string()).into())
    }

    pub async fn me(&self, user_id: Uuid, now: DateTime<Utc>) -> CoreResult<Profile> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(CoreError::NotFound("User"))?;
        let workspaces = self.workspaces.list_workspaces(user_id, now).await?;
        Ok(Profile { user, workspaces })
    }
}
