// Sale phases and their gates

use serde::{Deserialize, Serialize};
use std::fmt;

/// The paths through which tokens can be minted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    AllowList,
    PublicSale,
    Auction,
    Reserve,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AllowList => "allow-list",
            Phase::PublicSale => "public-sale",
            Phase::Auction => "auction",
            Phase::Reserve => "reserve",
        };
        f.write_str(name)
    }
}

/// Auction lifecycle. There is no edge back from `Started`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionState {
    #[default]
    NotStarted,
    Started,
}

/// The three independent phase gates
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseGates {
    pub allow_list: bool,
    pub public_sale: bool,
    pub auction: AuctionState,
}

impl PhaseGates {
    /// Whether minting through `phase` is currently open.
    /// The reserve path has no gate.
    pub fn is_open(&self, phase: Phase) -> bool {
        match phase {
            Phase::AllowList => self.allow_list,
            Phase::PublicSale => self.public_sale,
            Phase::Auction => self.auction == AuctionState::Started,
            Phase::Reserve => true,
        }
    }
}
