pub use crate::{
    ActionOutcome, EventLog, FieldNames, FlatNode, NoListener, NodeId, NodeView, TreeAction,
    TreeConfig, TreeError, TreeEvent, TreeListener, TreeNode, TreeResult, TreeState,
    TreeStateSnapshot,
};
