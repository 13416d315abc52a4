use serde::{Deserialize, Serialize};

/// External-system submission status. Mirrors the gateway's numeric
/// convention: 0 = failed, 1 = success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum SyncStatus {
    Failed = 0,
    Success = 1,
}

impl SyncStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Self {
        if value == 1 {
            SyncStatus::Success
        } else {
            SyncStatus::Failed
        }
    }
}

/// One submission attempt for one order. The only persisted entity:
/// scheduled runs supersede the previous record for the same order,
/// manual retriggers append a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAudit {
    pub order_id: String,
    pub status: SyncStatus,
    pub message: String,
    /// External correlation id ("guid") from the first successful
    /// sales-invoice split
    pub correlation_id: Option<String>,
    /// Raw gateway response, stored verbatim for traceability
    pub raw_response: Option<String>,
    pub retry_count: i32,
}

impl SyncAudit {
    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}
