//! Ranking strategies shipped with the service

pub mod account_balance;
pub mod deposit_withdrawal;
pub mod governance_votes;
pub mod liquidity_share;
pub mod position_pnl;
pub mod social_registration;

pub use account_balance::AccountBalance;
pub use deposit_withdrawal::DepositWithdrawalCount;
pub use governance_votes::GovernanceVotes;
pub use liquidity_share::LiquidityShare;
pub use position_pnl::PositionPnl;
pub use social_registration::SocialRegistration;
