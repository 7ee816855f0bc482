use crate::connection::{Frame, Session};
use crate::error::ProtocolResult;
use crate::registry::EventRegistry;

/// What happened during one dispatch: how many handlers ran and which of
/// them failed. Failures never stop the rest of the slot from running.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub invoked: usize,
    pub failures: Vec<anyhow::Error>,
}

impl DispatchReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Route a frame to every handler registered for the session's current
/// state and the frame's packet id, in registration order.
///
/// An empty slot is a silent no-op; unhandled packets are normal for a
/// protocol client. The handler list is resolved once, before the first
/// handler runs, so a handler advancing the state mid-sequence does not
/// change which handlers fire for this frame.
pub fn dispatch(
    registry: &EventRegistry,
    session: &mut Session,
    frame: &Frame,
) -> ProtocolResult<DispatchReport> {
    let handlers = registry.handlers_for(session.state(), frame.packet_id)?;
    let mut report = DispatchReport::default();
    for handler in handlers {
        report.invoked += 1;
        if let Err(err) = handler(session, &frame.payload) {
            report.failures.push(err);
        }
    }
    Ok(report)
}
