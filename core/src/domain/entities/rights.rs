//! Per-(business, user) capability matrix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single capability a user may hold on a business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Product,
    Inventory,
    Sales,
    SalesPos,
    Suppliers,
    AnalyticsView,
    Owner,
}

impl Capability {
    /// Every capability, in column order
    pub const ALL: [Capability; 7] = [
        Capability::Product,
        Capability::Inventory,
        Capability::Sales,
        Capability::SalesPos,
        Capability::Suppliers,
        Capability::AnalyticsView,
        Capability::Owner,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Product => "productRights",
            Capability::Inventory => "inventoryRights",
            Capability::Sales => "salesRights",
            Capability::SalesPos => "salesPosRights",
            Capability::Suppliers => "suppliersRights",
            Capability::AnalyticsView => "analyticsViewRights",
            Capability::Owner => "ownerRights",
        };
        f.write_str(name)
    }
}

/// The seven capability flags of a rights row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsFlags {
    pub product_rights: bool,
    pub inventory_rights: bool,
    pub sales_rights: bool,
    pub sales_pos_rights: bool,
    pub suppliers_rights: bool,
    pub analytics_view_rights: bool,
    pub owner_rights: bool,
}

impl RightsFlags {
    /// Every flag set; what the creator of a business receives
    pub fn all() -> Self {
        Self {
            product_rights: true,
            inventory_rights: true,
            sales_rights: true,
            sales_pos_rights: true,
            suppliers_rights: true,
            analytics_view_rights: true,
            owner_rights: true,
        }
    }

    /// No flag set
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Product => self.product_rights,
            Capability::Inventory => self.inventory_rights,
            Capability::Sales => self.sales_rights,
            Capability::SalesPos => self.sales_pos_rights,
            Capability::Suppliers => self.suppliers_rights,
            Capability::AnalyticsView => self.analytics_view_rights,
            Capability::Owner => self.owner_rights,
        }
    }
}

/// Rights row for one (business, user) pair
///
/// Reported when a write would leave a business without any owner
pub const LAST_OWNER_MESSAGE: &str = "A business must keep at least one owner";

/// Whether `user_id` holds the only `ownerRights` row of `business_id` among `rows`
pub fn is_sole_owner<'a>(
    rows: impl IntoIterator<Item = &'a BusinessUserRights>,
    business_id: Uuid,
    user_id: Uuid,
) -> bool {
    let mut owners = rows
        .into_iter()
        .filter(|row| row.business_id == business_id && row.is_owner());
    matches!((owners.next(), owners.next()), (Some(only), None) if only.user_id == user_id)
}

/// At most one row exists per pair. A missing row is equivalent to a row with
/// every flag false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUserRights {
    pub business_id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub flags: RightsFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessUserRights {
    pub fn new(business_id: Uuid, user_id: Uuid, flags: RightsFlags) -> Self {
        let now = Utc::now();
        Self {
            business_id,
            user_id,
            flags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full rights for the user who created the business
    pub fn owner(business_id: Uuid, user_id: Uuid) -> Self {
        Self::new(business_id, user_id, RightsFlags::all())
    }

    /// The all-false row reported when no row is stored
    pub fn none(business_id: Uuid, user_id: Uuid) -> Self {
        Self::new(business_id, user_id, RightsFlags::none())
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.flags.has(capability)
    }

    pub fn is_owner(&self) -> bool {
        self.flags.owner_rights
    }

    /// Applies a partial update of the flags; the key never changes
    pub fn apply(&mut self, patch: &RightsPatch) {
        let flags = &mut self.flags;
        let pairs = [
            (&mut flags.product_rights, patch.product_rights),
            (&mut flags.inventory_rights, patch.inventory_rights),
            (&mut flags.sales_rights, patch.sales_rights),
            (&mut flags.sales_pos_rights, patch.sales_pos_rights),
            (&mut flags.suppliers_rights, patch.suppliers_rights),
            (&mut flags.analytics_view_rights, patch.analytics_view_rights),
            (&mut flags.owner_rights, patch.owner_rights),
        ];
        for (flag, value) in pairs {
            if let Some(value) = value {
                *flag = value;
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a rights row's flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsPatch {
    pub product_rights: Option<bool>,
    pub inventory_rights: Option<bool>,
    pub sales_rights: Option<bool>,
    pub sales_pos_rights: Option<bool>,
    pub suppliers_rights: Option<bool>,
    pub analytics_view_rights: Option<bool>,
    pub owner_rights: Option<bool>,
}

impl RightsPatch {
    /// Flags for a new grant: supplied values, everything else false
    pub fn into_flags(self) -> RightsFlags {
        RightsFlags {
            product_rights: self.product_rights.unwrap_or(false),
            inventory_rights: self.inventory_rights.unwrap_or(false),
            sales_rights: self.sales_rights.unwrap_or(false),
            sales_pos_rights: self.sales_pos_rights.unwrap_or(false),
            suppliers_rights: self.suppliers_rights.unwrap_or(false),
            analytics_view_rights: self.analytics_view_rights.unwrap_or(false),
            owner_rights: self.owner_rights.unwrap_or(false),
        }
    }
}
