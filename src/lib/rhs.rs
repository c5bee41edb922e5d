pub mod builder;
pub mod node;
pub mod resolver;
pub mod status;

pub use builder::{
    publish_identity_state,
    IdentityTrees,
    NodesBuilder,
};
pub use node::{
    NodeType,
    ProofNode,
};
pub use resolver::RhsResolver;
pub use status::{
    resolve_revocation_status,
    GenesisContext,
    RevocationStatus,
    RevocationStatusError,
};
