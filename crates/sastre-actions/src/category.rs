/// Ordering domain for the three long-running action categories the
/// engine issues. Attach/activate proceeds WAN-edge first, then vSmart
/// templates, then vSmart policy activation; detach/deactivate runs the
/// same list in reverse (spec.md §4.F.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    AttachWanEdgeTemplate,
    AttachVsmartTemplate,
    ActivateVsmartPolicy,
}

pub fn attach_order() -> [ActionCategory; 3] {
    [
        ActionCategory::AttachWanEdgeTemplate,
        ActionCategory::AttachVsmartTemplate,
        ActionCategory::ActivateVsmartPolicy,
    ]
}

pub fn teardown_order() -> [ActionCategory; 3] {
    let mut order = attach_order();
    order.reverse();
    order
}
