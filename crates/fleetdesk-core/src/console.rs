// ── Console facade ──
//
// Entry point for front ends: owns the request pipeline, the shared
// notification channel, and a root cancellation token. Screens are opened
// from here and each gets a child token, so closing one screen leaves the
// others running while `shutdown()` stops them all.

use std::sync::Arc;

use fleetdesk_api::{ApiClient, SessionContext};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::notify::NotificationChannel;
use crate::screen::{
    DeviceManager, OrganizationMenu, OrganizationTable, PaymentLedger, ScreenContext,
};

/// Cheaply cloneable handle to one console session.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    client: Arc<ApiClient>,
    notices: NotificationChannel,
    cancel: CancellationToken,
}

impl Console {
    /// Build the pipeline from `config`. Performs no I/O.
    pub fn new(config: &ConsoleConfig, session: SessionContext) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.api_url.as_str(), session, &config.transport())?;
        info!(api_url = %config.api_url, "console ready");
        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(ConsoleInner {
                client: Arc::new(client),
                notices: NotificationChannel::new(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn session(&self) -> &SessionContext {
        self.inner.client.session()
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.inner.notices
    }

    // ── Credential ───────────────────────────────────────────────────

    /// Store tokens obtained from the sign-in exchange.
    pub fn sign_in(
        &self,
        access: SecretString,
        refresh: Option<SecretString>,
    ) -> Result<(), CoreError> {
        self.session().set_tokens(access, refresh)?;
        info!("signed in");
        Ok(())
    }

    /// Forget tokens and the selected organization.
    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.session().clear()?;
        info!("signed out");
        Ok(())
    }

    // ── Screens ──────────────────────────────────────────────────────

    fn screen_context(&self) -> ScreenContext {
        ScreenContext {
            client: Arc::clone(&self.inner.client),
            notices: self.inner.notices.clone(),
            cancel: self.inner.cancel.child_token(),
        }
    }

    /// Open (but do not load) the organization table.
    pub fn organization_table(&self) -> OrganizationTable {
        OrganizationTable::new(self.screen_context())
    }

    pub fn device_manager(&self) -> DeviceManager {
        DeviceManager::new(self.screen_context())
    }

    pub fn organization_menu(&self) -> OrganizationMenu {
        OrganizationMenu::new(self.screen_context())
    }

    pub fn payment_ledger(&self) -> PaymentLedger {
        PaymentLedger::new(self.screen_context())
    }

    /// Tear down every open screen. Late responses are dropped.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.notices.clear();
    }
}
