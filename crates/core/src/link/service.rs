//! Linked event creation
//!
//! Creates the calendar event for a board item, stamped with the
//! back-reference the change feed later uses to find the item again. The
//! insert is sent once: a reset connection may still have created the event,
//! and a blind retry would duplicate it.

use std::sync::Arc;

use boardsync_domain::{
    build_linked_event, EventZone, InsertEventRequest, RawCalendarEvent, Result, ScheduledItem,
};
use tracing::{info, instrument, warn};

use crate::calendar_ports::ChangeFeedProvider;
use crate::sync::CalendarCredentialStore;

pub struct EventLinkService {
    provider: Arc<dyn ChangeFeedProvider>,
    credentials: CalendarCredentialStore,
    zone: EventZone,
}

impl EventLinkService {
    pub fn new(
        provider: Arc<dyn ChangeFeedProvider>,
        credentials: CalendarCredentialStore,
        zone: EventZone,
    ) -> Self {
        Self { provider, credentials, zone }
    }

    /// Create the event for `item` on `calendar_id` with `subject_id`'s
    /// credentials. `Ok(None)` when the subject has no stored credentials.
    ///
    /// # Errors
    /// `InvalidInput` for an item that cannot be scheduled; provider errors
    /// as returned by the insert.
    #[instrument(skip(self, item), fields(item_id = item.item_id))]
    pub async fn create_linked_event(
        &self,
        subject_id: &str,
        calendar_id: &str,
        item: &ScheduledItem,
    ) -> Result<Option<RawCalendarEvent>> {
        let event = build_linked_event(item, &self.zone)?;

        let Some(credentials) = self.credentials.get(subject_id).await? else {
            warn!(subject_id, "no calendar credentials, linked event not created");
            return Ok(None);
        };

        let request = InsertEventRequest {
            calendar_id: calendar_id.to_string(),
            access_token: credentials.access_token,
            event,
        };
        let created = self.provider.insert_event(&request).await?;

        info!(event_id = %created.id, calendar_id, "linked calendar event created");
        Ok(Some(created))
    }
}
