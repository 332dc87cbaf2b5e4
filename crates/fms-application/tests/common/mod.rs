//! In-memory fakes for the identity provider and the backend.

#![allow(dead_code)]

use async_trait::async_trait;
use fms_application::ClientContext;
use fms_core::backend::ScholarshipBackend;
use fms_core::config::ClientConfig;
use fms_core::error::{FmsError, Result};
use fms_core::profile::Profile;
use fms_core::reminder::{Reminder, SubscribeReceipt};
use fms_core::scholarship::Scholarship;
use fms_core::session::{CredentialStore, IdentityProvider, IssuedCredential};
use fms_infrastructure::InMemoryCredentialStore;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PASSWORD: &str = "secret123";

fn uid_of(token: &str) -> Result<String> {
    token
        .strip_prefix("tok:")
        .and_then(|rest| rest.split(':').next())
        .map(str::to_string)
        .ok_or(FmsError::SessionExpired)
}

// ============================================================================
// Identity provider
// ============================================================================

#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, (String, String)>>,
    issued: AtomicU64,
    pub reject_refresh: AtomicBool,
    pub refresh_calls: AtomicUsize,
    /// Lifetime reported for issued tokens.
    pub expires_in: Mutex<Option<Duration>>,
}

impl FakeIdentity {
    pub fn with_account(self, email: &str, password: &str, uid: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), uid.to_string()));
        self
    }

    fn issue(&self, uid: &str, email: &str) -> IssuedCredential {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        IssuedCredential {
            id_token: format!("tok:{}:{}", uid, n),
            refresh_token: Some(format!("refresh:{}", uid)),
            uid: uid.to_string(),
            email: email.to_string(),
            expires_in: Some(
                self.expires_in
                    .lock()
                    .unwrap()
                    .unwrap_or(Duration::from_secs(3600)),
            ),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedCredential> {
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((stored, uid)) if stored == password => Ok(self.issue(&uid, email)),
            _ => Err(FmsError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<IssuedCredential> {
        let uid = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(FmsError::EmailInUse);
            }
            let uid = format!("uid-{}", accounts.len() + 1);
            accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
            uid
        };
        Ok(self.issue(&uid, email))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedCredential> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_refresh.load(Ordering::SeqCst) {
            return Err(FmsError::SessionExpired);
        }
        let uid = refresh_token
            .strip_prefix("refresh:")
            .ok_or(FmsError::SessionExpired)?;
        let mut issued = self.issue(uid, "");
        issued.expires_in = Some(Duration::from_secs(3600));
        Ok(issued)
    }
}

// ============================================================================
// Backend
// ============================================================================

type Scripted<T> = (Duration, Result<T>);

#[derive(Default)]
pub struct FakeBackend {
    profiles: Mutex<HashMap<String, Profile>>,
    catalog: Mutex<Vec<Scholarship>>,
    reminders: Mutex<HashMap<String, Vec<Reminder>>>,
    eligible_script: Mutex<VecDeque<Scripted<Vec<Scholarship>>>>,
    revoked: Mutex<HashSet<String>>,
    pub save_error: Mutex<Option<FmsError>>,
    pub fail_reminder_list: AtomicBool,
    pub subscribe_delay: Mutex<Duration>,
    pub eligible_calls: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_catalog(self, catalog: Vec<Scholarship>) -> Self {
        *self.catalog.lock().unwrap() = catalog;
        self
    }

    /// Queues eligibility responses, consumed one per call in call order.
    pub fn script_eligible(&self, responses: Vec<Scripted<Vec<Scholarship>>>) {
        self.eligible_script.lock().unwrap().extend(responses);
    }

    /// Rejects every token issued for `uid` from now on.
    pub fn revoke(&self, uid: &str) {
        self.revoked.lock().unwrap().insert(uid.to_string());
    }

    pub fn profile_of(&self, uid: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(uid).cloned()
    }

    pub fn reminders_of(&self, uid: &str) -> Vec<Reminder> {
        self.reminders
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .unwrap_or_default()
    }

    fn authenticate(&self, token: &str) -> Result<String> {
        let uid = uid_of(token)?;
        if self.revoked.lock().unwrap().contains(&uid) {
            return Err(FmsError::SessionExpired);
        }
        Ok(uid)
    }
}

#[async_trait]
impl ScholarshipBackend for FakeBackend {
    async fn save_profile(&self, token: &str, profile: &Profile) -> Result<Option<Profile>> {
        let uid = self.authenticate(token)?;
        if let Some(err) = self.save_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.profiles
            .lock()
            .unwrap()
            .insert(uid, profile.clone());
        // The real backend only acknowledges the write.
        Ok(None)
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let uid = self.authenticate(token)?;
        self.profile_of(&uid)
            .ok_or_else(|| FmsError::not_found("profile", "me"))
    }

    async fn fetch_eligible(&self, token: &str) -> Result<Vec<Scholarship>> {
        self.eligible_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.eligible_script.lock().unwrap().pop_front();
        let uid = self.authenticate(token)?;

        match scripted {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => {
                if self.profile_of(&uid).is_none() {
                    return Err(FmsError::ProfileIncomplete);
                }
                Ok(self.catalog.lock().unwrap().clone())
            }
        }
    }

    async fn list_reminders(&self, token: &str) -> Result<Vec<Reminder>> {
        let uid = self.authenticate(token)?;
        if self.fail_reminder_list.load(Ordering::SeqCst) {
            return Err(FmsError::Unreachable("connection refused".into()));
        }
        Ok(self.reminders_of(&uid))
    }

    async fn subscribe_reminder(
        &self,
        token: &str,
        scholarship_id: &str,
    ) -> Result<SubscribeReceipt> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let uid = self.authenticate(token)?;

        let delay = *self.subscribe_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let scholarship = self
            .catalog
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.scholarship_id == scholarship_id)
            .cloned()
            .ok_or_else(|| FmsError::not_found("scholarship", "Scholarship not found"))?;

        // Keyed by (uid, scholarship) like the real store: a repeat overwrites.
        let mut reminders = self.reminders.lock().unwrap();
        let list = reminders.entry(uid.clone()).or_default();
        list.retain(|r| r.scholarship_id != scholarship_id);
        list.push(Reminder::for_scholarship(
            &scholarship,
            format!("{}@example.com", uid),
        ));

        Ok(SubscribeReceipt {
            message: Some("Reminder set successfully".into()),
            email_status: Some("sent".into()),
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn scholarship(id: &str, score: f64) -> Scholarship {
    Scholarship {
        scholarship_id: id.to_string(),
        name: format!("Scholarship {}", id),
        provider: "Test Trust".to_string(),
        deadline: "2030-12-31".to_string(),
        amount: "₹10,000".to_string(),
        score,
        reasons: vec!["Income ≤ ₹2.5L".to_string()],
        apply_link: "https://example.org/apply".to_string(),
        description: None,
    }
}

pub struct Harness {
    pub client: Arc<ClientContext>,
    pub backend: Arc<FakeBackend>,
    pub identity: Arc<FakeIdentity>,
    pub store: Arc<InMemoryCredentialStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(InMemoryCredentialStore::new())
    }

    pub fn with_store(store: InMemoryCredentialStore) -> Self {
        let backend = FakeBackend::default().with_catalog(vec![
            scholarship("sch_1", 0.98),
            scholarship("sch_2", 0.55),
        ]);
        Self::build(store, backend, FakeIdentity::default())
    }

    pub fn build(store: InMemoryCredentialStore, backend: FakeBackend, identity: FakeIdentity) -> Self {
        let store = Arc::new(store);
        let backend = Arc::new(backend);
        let identity = Arc::new(
            identity
                .with_account("asha@example.com", PASSWORD, "uid-asha")
                .with_account("ravi@example.com", PASSWORD, "uid-ravi"),
        );

        let client = ClientContext::with_ports(
            ClientConfig::default(),
            store.clone() as Arc<dyn CredentialStore>,
            identity.clone() as Arc<dyn IdentityProvider>,
            backend.clone() as Arc<dyn ScholarshipBackend>,
        );

        Self {
            client: Arc::new(client),
            backend,
            identity,
            store,
        }
    }

    pub async fn sign_in_asha(&self) {
        self.client
            .session
            .sign_in("asha@example.com", PASSWORD)
            .await
            .unwrap();
    }
}
