//! Entity registry: which tables take part in the soft-delete lifecycle
//! and how they cascade.
//!
//! Every piece of lifecycle SQL (cascade, restore, purge guards, recycle
//! bin listings, migrations) is generated from this table. Adding a new
//! cascading entity means adding a variant and an [`EntityDef`] here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entity types that participate in the soft-delete lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "candidates")]
    Candidate,
    #[serde(rename = "employers")]
    Employer,
    #[serde(rename = "job_orders")]
    JobOrder,
    #[serde(rename = "placements")]
    Placement,
    #[serde(rename = "documents")]
    Document,
    #[serde(rename = "visa_tracking")]
    VisaTracking,
    #[serde(rename = "passport_tracking")]
    PassportTracking,
    #[serde(rename = "medical_tracking")]
    MedicalTracking,
    #[serde(rename = "interview_tracking")]
    InterviewTracking,
    #[serde(rename = "travel_tracking")]
    TravelTracking,
    #[serde(rename = "payments")]
    Payment,
}

/// A dependent relationship: rows of `entity` whose `foreign_key` column
/// holds the parent's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependent {
    pub entity: EntityType,
    pub foreign_key: &'static str,
}

/// Reverse edge of a [`Dependent`]: the parent table a row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub entity: EntityType,
    pub foreign_key: &'static str,
}

/// Registry entry for one entity type.
#[derive(Debug)]
pub struct EntityDef {
    /// Table name.
    pub table: &'static str,
    /// Column shown as the row's label in listings.
    pub label: &'static str,
    /// Direct dependents soft-deleted together with this entity.
    pub dependents: &'static [Dependent],
}

const fn dep(entity: EntityType, foreign_key: &'static str) -> Dependent {
    Dependent {
        entity,
        foreign_key,
    }
}

const CANDIDATE_DEPENDENTS: &[Dependent] = &[
    dep(EntityType::Document, "candidateId"),
    dep(EntityType::Placement, "candidateId"),
    dep(EntityType::VisaTracking, "candidateId"),
    dep(EntityType::PassportTracking, "candidateId"),
    dep(EntityType::MedicalTracking, "candidateId"),
    dep(EntityType::InterviewTracking, "candidateId"),
    dep(EntityType::TravelTracking, "candidateId"),
    dep(EntityType::Payment, "candidateId"),
];

const EMPLOYER_DEPENDENTS: &[Dependent] = &[dep(EntityType::JobOrder, "employerId")];

const JOB_ORDER_DEPENDENTS: &[Dependent] = &[dep(EntityType::Placement, "jobOrderId")];

static CANDIDATE: EntityDef = EntityDef {
    table: "candidates",
    label: "name",
    dependents: CANDIDATE_DEPENDENTS,
};
static EMPLOYER: EntityDef = EntityDef {
    table: "employers",
    label: "companyName",
    dependents: EMPLOYER_DEPENDENTS,
};
static JOB_ORDER: EntityDef = EntityDef {
    table: "job_orders",
    label: "positionTitle",
    dependents: JOB_ORDER_DEPENDENTS,
};
static PLACEMENT: EntityDef = EntityDef {
    table: "placements",
    label: "status",
    dependents: &[],
};
static DOCUMENT: EntityDef = EntityDef {
    table: "documents",
    label: "fileName",
    dependents: &[],
};
static VISA_TRACKING: EntityDef = EntityDef {
    table: "visa_tracking",
    label: "status",
    dependents: &[],
};
static PASSPORT_TRACKING: EntityDef = EntityDef {
    table: "passport_tracking",
    label: "status",
    dependents: &[],
};
static MEDICAL_TRACKING: EntityDef = EntityDef {
    table: "medical_tracking",
    label: "status",
    dependents: &[],
};
static INTERVIEW_TRACKING: EntityDef = EntityDef {
    table: "interview_tracking",
    label: "status",
    dependents: &[],
};
static TRAVEL_TRACKING: EntityDef = EntityDef {
    table: "travel_tracking",
    label: "status",
    dependents: &[],
};
static PAYMENT: EntityDef = EntityDef {
    table: "payments",
    label: "description",
    dependents: &[],
};

impl EntityType {
    /// All entity types, parents before their dependents.
    pub const ALL: [EntityType; 11] = [
        EntityType::Candidate,
        EntityType::Employer,
        EntityType::JobOrder,
        EntityType::Placement,
        EntityType::Document,
        EntityType::VisaTracking,
        EntityType::PassportTracking,
        EntityType::MedicalTracking,
        EntityType::InterviewTracking,
        EntityType::TravelTracking,
        EntityType::Payment,
    ];

    /// Registry entry for this entity type.
    pub fn def(self) -> &'static EntityDef {
        match self {
            EntityType::Candidate => &CANDIDATE,
            EntityType::Employer => &EMPLOYER,
            EntityType::JobOrder => &JOB_ORDER,
            EntityType::Placement => &PLACEMENT,
            EntityType::Document => &DOCUMENT,
            EntityType::VisaTracking => &VISA_TRACKING,
            EntityType::PassportTracking => &PASSPORT_TRACKING,
            EntityType::MedicalTracking => &MEDICAL_TRACKING,
            EntityType::InterviewTracking => &INTERVIEW_TRACKING,
            EntityType::TravelTracking => &TRAVEL_TRACKING,
            EntityType::Payment => &PAYMENT,
        }
    }

    /// Table name, also used as the entity's tag at the IPC boundary.
    pub fn table(self) -> &'static str {
        self.def().table
    }

    pub fn as_str(self) -> &'static str {
        self.table()
    }

    /// Direct dependents of this entity type.
    pub fn dependents(self) -> &'static [Dependent] {
        self.def().dependents
    }

    /// Parent tables this entity type points at, in registry order.
    pub fn parents(self) -> Vec<ParentLink> {
        EntityType::ALL
            .iter()
            .flat_map(|parent| {
                parent
                    .dependents()
                    .iter()
                    .filter(move |d| d.entity == self)
                    .map(move |d| ParentLink {
                        entity: *parent,
                        foreign_key: d.foreign_key,
                    })
            })
            .collect()
    }

    /// Parent whose label gives a deleted row its display context.
    pub fn context_parent(self) -> Option<ParentLink> {
        self.parents().into_iter().next()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag did not name a registered entity type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        let entity = match tag.as_str() {
            "candidates" | "candidate" => EntityType::Candidate,
            "employers" | "employer" => EntityType::Employer,
            "job_orders" | "job_order" => EntityType::JobOrder,
            "placements" | "placement" => EntityType::Placement,
            "documents" | "document" => EntityType::Document,
            "visa_tracking" | "visa" => EntityType::VisaTracking,
            "passport_tracking" | "passport" => EntityType::PassportTracking,
            "medical_tracking" | "medical" => EntityType::MedicalTracking,
            "interview_tracking" | "interview" => EntityType::InterviewTracking,
            "travel_tracking" | "travel" => EntityType::TravelTracking,
            "payments" | "payment" => EntityType::Payment,
            _ => return Err(UnknownEntityType(s.to_string())),
        };
        Ok(entity)
    }
}
