//! Covers the cross-tenant read/delete denial scenario: a resource that
//! belongs to another tenant must be reported identically to one that
//! does not exist.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use eap_core::domain::errors::CoreError;
use eap_core::domain::models::task::TaskGraph;
use eap_core::domain::models::{PlanRecord, PlanStatus};
use eap_core::services::policy::assert_resource_belongs_to_tenant;
use uuid::Uuid;

struct InMemoryPlans {
    plans: Mutex<HashMap<Uuid, PlanRecord>>,
}

impl InMemoryPlans {
    fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
        }
    }

    fn insert(&self, plan: PlanRecord) {
        self.plans.lock().unwrap().insert(plan.id, plan);
    }

    /// Mirrors a tenant-scoped repository read: returns `None` for a plan
    /// that exists but belongs to a different tenant, exactly like one
    /// that was never created.
    fn get_for_tenant(&self, tenant_id: Uuid, id: Uuid) -> Option<PlanRecord> {
        self.plans
            .lock()
            .unwrap()
            .get(&id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
    }

    fn delete_for_tenant(&self, tenant_id: Uuid, id: Uuid) -> bool {
        let mut plans = self.plans.lock().unwrap();
        if plans.get(&id).is_some_and(|p| p.tenant_id == tenant_id) {
            plans.remove(&id);
            true
        } else {
            false
        }
    }
}

fn seed_plan(tenant_id: Uuid) -> PlanRecord {
    PlanRecord {
        id: Uuid::new_v4(),
        tenant_id,
        goal_id: Uuid::new_v4(),
        graph: TaskGraph::new("Deploy service X", vec![]).unwrap(),
        status: PlanStatus::PendingApproval,
        created_by: Uuid::new_v4(),
        approved_by: None,
        created_at: Utc::now(),
        decided_at: None,
    }
}

#[test]
fn a_plan_from_another_tenant_reads_as_not_found() {
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let repo = InMemoryPlans::new();
    let plan = seed_plan(tenant_a);
    let plan_id = plan.id;
    repo.insert(plan);

    assert!(repo.get_for_tenant(tenant_a, plan_id).is_some());
    assert!(repo.get_for_tenant(tenant_b, plan_id).is_none());
    assert!(!repo.delete_for_tenant(tenant_b, plan_id));
    assert!(repo.get_for_tenant(tenant_a, plan_id).is_some());
    assert!(repo.delete_for_tenant(tenant_a, plan_id));
}

#[test]
fn policy_cross_tenant_guard_reports_not_found_never_forbidden() {
    let owner_tenant = Uuid::new_v4();
    let requester_tenant = Uuid::new_v4();
    let plan_id = Uuid::new_v4();

    let err = assert_resource_belongs_to_tenant("plan", owner_tenant, requester_tenant, plan_id).unwrap_err();

    match err {
        CoreError::NotFound { resource, id } => {
            assert_eq!(resource, "plan");
            assert_eq!(id, plan_id);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn same_tenant_access_is_allowed() {
    let tenant = Uuid::new_v4();
    let plan_id = Uuid::new_v4();
    assert!(assert_resource_belongs_to_tenant("plan", tenant, tenant, plan_id).is_ok());
}
