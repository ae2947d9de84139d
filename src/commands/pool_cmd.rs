//! Commands for allocation and spin

use crate::domain::{DomainResult, Idea, MemberRole, SpinFilters};
use crate::pool::{AllocationOutcome, Eligibility};
use crate::repository::{AllocationOperations, SpinOperations};
use crate::AppState;
use super::permissions::require_role;

/// Hand every active member `quota` random ideas. Admin or owner.
pub async fn allocate(state: &AppState, caller: &str, jar_id: u32, quota: u32) -> DomainResult<AllocationOutcome> {
    require_role(state, jar_id, caller, MemberRole::Admin).await?;
    state.pool_repo.allocate(jar_id, quota).await.map_err(|e| {
        log::warn!("Allocation in jar {} by {} failed: {}", jar_id, caller, e);
        e
    })
}

/// Pick one idea for the caller that passes `filters`
pub async fn spin(state: &AppState, caller: &str, jar_id: u32, filters: &SpinFilters) -> DomainResult<Idea> {
    require_role(state, jar_id, caller, MemberRole::Member).await?;
    state.pool_repo.spin(jar_id, caller, filters).await.map_err(|e| {
        log::warn!("Spin in jar {} by {} failed: {}", jar_id, caller, e);
        e
    })
}

/// Members and ideas the next allocation would draw from
pub async fn eligibility(state: &AppState, caller: &str, jar_id: u32) -> DomainResult<Eligibility> {
    require_role(state, jar_id, caller, MemberRole::Member).await?;
    state.pool_repo.eligibility(jar_id).await
}
