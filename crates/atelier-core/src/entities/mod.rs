//! Entity types, one module per dashboard page.
//!
//! | Page                  | Store key       | Entity         | Terminal state |
//! |-----------------------|-----------------|----------------|----------------|
//! | Business Intelligence | `bi_signals`    | Signal         | Archived       |
//! | Business Intelligence | `bi_comments`   | SignalComment  | (none)         |
//! | Fashion Lab           | `fl_designs`    | Design         | Archived       |
//! | Funding               | `fd_rounds`     | FundingRound   | Declined       |
//! | Funding               | `fd_investors`  | Investor       | Declined       |
//! | Prototype Vault       | `pv_prototypes` | Prototype      | Archived       |
//! | Brand & Culture       | `bc_assets`     | BrandAsset     | Retired        |
//! | Innovation Lab        | `il_challenges` | Challenge      | Archived       |
//! | Innovation Lab        | `il_solutions`  | Solution       | Rejected       |

pub mod brand;
pub mod fashion;
pub mod funding;
pub mod innovation;
pub mod intelligence;
pub mod prototype;

pub use brand::{AssetKind, AssetSort, AssetStatus, BrandAsset};
pub use fashion::{active_cost, Design, DesignCategory, DesignSort, DesignStatus};
pub use funding::{
    commitments, funding_totals, ownership_split, Commitments, FundingRound, FundingTotals,
    Investor, InvestorKind, InvestorSort, InvestorStatus, OwnershipShare, RoundSort, RoundStage,
    RoundStatus,
};
pub use innovation::{
    challenge_progress, Challenge, ChallengeCategory, ChallengeProgress, ChallengeSort,
    ChallengeStatus, Priority, Solution, SolutionSort, SolutionStatus,
};
pub use intelligence::{
    rising_share, CommentSort, Signal, SignalCategory, SignalComment, SignalSort, SignalStatus,
    Trajectory,
};
pub use prototype::{validation_rate, Prototype, PrototypeKind, PrototypeSort, PrototypeStatus};
