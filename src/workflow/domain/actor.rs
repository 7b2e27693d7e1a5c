//! Entity types, actor roles, and actor reference types.

use super::{ActorId, ParseEntityTypeError, ParseRoleError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of workflow item tracked through a status lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Purchase requisition raised by a staff member.
    Requisition,
    /// Vendor invoice awaiting approval and payment.
    Invoice,
    /// Vendor onboarding registration.
    VendorRegistration,
    /// Tender prequalification submission.
    TenderPrequalification,
}

impl EntityType {
    /// All entity types, in display order.
    pub const ALL: [Self; 4] = [
        Self::Requisition,
        Self::Invoice,
        Self::VendorRegistration,
        Self::TenderPrequalification,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requisition => "requisition",
            Self::Invoice => "invoice",
            Self::VendorRegistration => "vendor_registration",
            Self::TenderPrequalification => "tender_prequalification",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntityType {
    type Error = ParseEntityTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "requisition" => Ok(Self::Requisition),
            "invoice" => Ok(Self::Invoice),
            "vendor_registration" => Ok(Self::VendorRegistration),
            "tender_prequalification" => Ok(Self::TenderPrequalification),
            _ => Err(ParseEntityTypeError(value.to_owned())),
        }
    }
}

/// Role an actor holds when interacting with the workflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Staff member raising requisitions.
    Requester,
    /// Line manager approving or rejecting submissions.
    Approver,
    /// Procurement officer progressing items through fulfilment.
    ProcurementOfficer,
    /// Finance officer handling invoice approval and payment.
    Finance,
    /// External vendor account.
    Vendor,
    /// System administrator.
    Admin,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Approver => "approver",
            Self::ProcurementOfficer => "procurement_officer",
            Self::Finance => "finance",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "requester" => Ok(Self::Requester),
            "approver" => Ok(Self::Approver),
            "procurement_officer" => Ok(Self::ProcurementOfficer),
            "finance" => Ok(Self::Finance),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Actor references persisted with each workflow item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRefs {
    submitter: ActorId,
    approver: Option<ActorId>,
    vendor: Option<ActorId>,
}

impl ActorRefs {
    /// Creates actor references with the mandatory submitter.
    #[must_use]
    pub const fn new(submitter: ActorId) -> Self {
        Self {
            submitter,
            approver: None,
            vendor: None,
        }
    }

    /// Sets the deciding approver.
    #[must_use]
    pub const fn with_approver(mut self, approver: ActorId) -> Self {
        self.approver = Some(approver);
        self
    }

    /// Sets the associated vendor account.
    #[must_use]
    pub const fn with_vendor(mut self, vendor: ActorId) -> Self {
        self.vendor = Some(vendor);
        self
    }

    /// Returns the submitting actor.
    #[must_use]
    pub const fn submitter(&self) -> ActorId {
        self.submitter
    }

    /// Returns the deciding approver, if recorded.
    #[must_use]
    pub const fn approver(&self) -> Option<ActorId> {
        self.approver
    }

    /// Returns the associated vendor account, if any.
    #[must_use]
    pub const fn vendor(&self) -> Option<ActorId> {
        self.vendor
    }
}

/// Identity and role of the actor requesting an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    actor: ActorId,
    role: Role,
}

impl ActorContext {
    /// Creates an actor context.
    #[must_use]
    pub const fn new(actor: ActorId, role: Role) -> Self {
        Self { actor, role }
    }

    /// Returns the actor identifier.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}
