use connectors::{base::cursor::RecordCursor, error::ExtractionError};

/// Poll state of one cursor: nothing probed yet, one record staged, or
/// a confirmed end of data.
enum Stage<N> {
    Unpolled,
    Pending(N),
    Exhausted,
}

/// Lookahead shim enforcing "at most one unconsumed record". The
/// backend cursor is advanced only when nothing is staged, so repeated
/// polling cannot skip records.
pub(crate) struct Staged<C: RecordCursor> {
    cursor: C,
    stage: Stage<C::Native>,
}

impl<C: RecordCursor> Staged<C> {
    pub(crate) fn new(cursor: C) -> Self {
        Staged {
            cursor,
            stage: Stage::Unpolled,
        }
    }

    /// Probes the cursor once if nothing is staged. A probe failure
    /// leaves the stage unpolled rather than exhausted; the caller sees
    /// the error and decides whether to retry or abandon the partition.
    pub(crate) async fn has_next(&mut self) -> Result<bool, ExtractionError> {
        match &self.stage {
            Stage::Pending(_) => Ok(true),
            Stage::Exhausted => Ok(false),
            Stage::Unpolled => match self.cursor.advance().await? {
                Some(native) => {
                    self.stage = Stage::Pending(native);
                    Ok(true)
                }
                None => {
                    self.stage = Stage::Exhausted;
                    Ok(false)
                }
            },
        }
    }

    /// Takes the staged record, returning the stage to unpolled so the
    /// next probe re-evaluates. `None` when nothing is staged, fresh or
    /// exhausted alike.
    pub(crate) fn take(&mut self) -> Option<C::Native> {
        match std::mem::replace(&mut self.stage, Stage::Unpolled) {
            Stage::Pending(native) => Some(native),
            Stage::Exhausted => {
                self.stage = Stage::Exhausted;
                None
            }
            Stage::Unpolled => None,
        }
    }

    pub(crate) async fn close(&mut self) -> Result<(), ExtractionError> {
        self.cursor.close().await
    }
}
