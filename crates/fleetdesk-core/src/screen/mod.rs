// ── Screens ──
//
// Each screen owns its mirrors and reports every operation outcome to the
// shared notification channel: mirror first, then the notification, then
// the result goes back to the caller as a value.

mod device_manager;
mod organization_menu;
mod organization_table;
mod payment_ledger;

use std::sync::Arc;

use fleetdesk_api::ApiClient;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::notify::NotificationChannel;

pub use device_manager::DeviceManager;
pub use organization_menu::OrganizationMenu;
pub use organization_table::OrganizationTable;
pub use payment_ledger::PaymentLedger;

/// What a screen is handed when it is opened.
#[derive(Clone)]
pub(crate) struct ScreenContext {
    pub(crate) client: Arc<ApiClient>,
    pub(crate) notices: NotificationChannel,
    /// Fired by the screen's `close()` and by console shutdown.
    pub(crate) cancel: CancellationToken,
}

impl ScreenContext {
    /// Post the outcome of an operation, unless the screen is gone.
    ///
    /// Errors always produce an Error notification carrying the error text.
    /// `success` decides whether (and what) to show for an `Ok`.
    pub(crate) fn settle<R>(
        &self,
        result: Result<R, CoreError>,
        success: impl FnOnce(&R) -> Option<String>,
    ) -> Result<R, CoreError> {
        if self.cancel.is_cancelled() {
            return result;
        }
        match &result {
            Ok(value) => {
                if let Some(text) = success(value) {
                    self.notices.success(text);
                }
            }
            Err(e) => self.notices.error(e.to_string()),
        }
        result
    }
}
