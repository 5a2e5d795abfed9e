//! Policy placement into proxy flow stages.

use apigen_intent::PolicyKind;

/// A point in request/response processing where a policy step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStage {
    /// Proxy endpoint pre-flow, request side.
    RequestPreFlow,
    /// Proxy endpoint post-flow, response side.
    ResponsePostFlow,
}

/// Fixed placement table. Kinds absent here get no flow step.
pub static STAGE_TABLE: [(PolicyKind, FlowStage); 6] = [
    (PolicyKind::VerifyApiKey, FlowStage::RequestPreFlow),
    (PolicyKind::Cors, FlowStage::RequestPreFlow),
    (PolicyKind::AssignMessage, FlowStage::RequestPreFlow),
    (PolicyKind::SpikeArrest, FlowStage::RequestPreFlow),
    (PolicyKind::Quota, FlowStage::RequestPreFlow),
    (PolicyKind::JavaScript, FlowStage::ResponsePostFlow),
];

/// Looks up the stage a policy kind executes in.
#[must_use]
pub fn stage_for(kind: &PolicyKind) -> Option<FlowStage> {
    STAGE_TABLE
        .iter()
        .find(|(k, _)| k == kind)
        .map(|(_, stage)| *stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_kind_is_placed() {
        for kind in &PolicyKind::KNOWN {
            assert!(stage_for(kind).is_some(), "{kind} has no stage");
        }
    }

    #[test]
    fn javascript_runs_on_response() {
        assert_eq!(
            stage_for(&PolicyKind::JavaScript),
            Some(FlowStage::ResponsePostFlow)
        );
        assert_eq!(
            stage_for(&PolicyKind::SpikeArrest),
            Some(FlowStage::RequestPreFlow)
        );
    }

    #[test]
    fn unknown_kind_is_not_placed() {
        assert_eq!(stage_for(&PolicyKind::Other("OAuthV2".into())), None);
    }
}
