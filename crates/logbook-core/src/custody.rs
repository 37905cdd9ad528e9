//! Physical custody instructions.
//!
//! The checkpoint never touches ID cards or badges itself. On each sign-in and
//! sign-out it hands an instruction to a [`CustodySink`], which the
//! surrounding service routes to whoever staffs the gate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CustodyInstruction {
  /// Keep the visitor's ID card and hand over the badge.
  RetainIdIssueBadge {
    entry_id:     Uuid,
    id_number:    String,
    badge_number: String,
  },
  /// Give the ID card back and collect the badge.
  ReturnIdReclaimBadge {
    entry_id:     Uuid,
    id_number:    String,
    badge_number: String,
  },
}

/// Receiver for custody instructions.
pub trait CustodySink: Send + Sync {
  fn instruct(&self, instruction: &CustodyInstruction);
}

/// Writes each instruction to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCustodySink;

impl CustodySink for TracingCustodySink {
  fn instruct(&self, instruction: &CustodyInstruction) {
    match instruction {
      CustodyInstruction::RetainIdIssueBadge { entry_id, id_number, badge_number } => {
        tracing::info!(%entry_id, %id_number, %badge_number, "retain ID card, issue badge");
      }
      CustodyInstruction::ReturnIdReclaimBadge { entry_id, id_number, badge_number } => {
        tracing::info!(%entry_id, %id_number, %badge_number, "return ID card, reclaim badge");
      }
    }
  }
}
