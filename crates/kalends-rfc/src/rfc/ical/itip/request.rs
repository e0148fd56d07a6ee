//! METHOD:REQUEST, limited to updates of components the calendar holds.

use super::{Method, MessageProcessor, merge};
use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::Calendar;

/// ## Summary
/// Updates existing components from a REQUEST.
///
/// Attendee handling is not implemented: a REQUEST naming attendees is
/// rejected, as is one whose UID the main calendar does not hold. Otherwise
/// the components merge as for PUBLISH.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestProcessor;

impl RequestProcessor {
    fn precheck(main: &Calendar, incoming: &Calendar) -> RfcResult<()> {
        for (_, component) in incoming.components() {
            if !component.kind().is_displayable() {
                continue;
            }
            if !component.attendees().is_empty() {
                return Err(RfcError::UnsupportedError(
                    "handling Attendees is not implemented".into(),
                ));
            }
            let uid = component.uid().ok_or_else(|| {
                RfcError::ValueError(format!("{} in REQUEST has no UID", component.name()))
            })?;
            if main.components_by_uid(uid).is_empty() {
                return Err(RfcError::ValueError(format!(
                    "UID:{uid} is not in the calendar; REQUEST can only update existing components"
                )));
            }
        }
        Ok(())
    }
}

impl MessageProcessor for RequestProcessor {
    fn method(&self) -> Method {
        Method::Request
    }

    fn process(&self, main: &mut Calendar, incoming: &Calendar) -> RfcResult<Vec<String>> {
        Self::precheck(main, incoming)?;
        merge(main, incoming, false)
    }
}
