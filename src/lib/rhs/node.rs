use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    crypto::poseidon::{
        hash_children,
        poseidon2,
        poseidon3,
    },
    domain::{
        error::DomainError,
        hash::Hash,
        proof::leaf_key,
        tree_state::TreeState,
    },
    ports::node_store::RhsError,
};

/// Kind of a node, derived from its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Middle,
    Leaf,
    State,
    Unknown,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Middle => "middle",
            NodeType::Leaf => "leaf",
            NodeType::State => "state",
            NodeType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A tree node as published to the Reverse Hash Service.
///
/// On the wire both the hash and the children are big-endian hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeJson", into = "NodeJson")]
pub struct ProofNode {
    pub hash: Hash,
    pub children: Vec<Hash>,
}

impl ProofNode {
    pub fn middle(left: Hash, right: Hash) -> Self {
        Self {
            hash: poseidon2(&left, &right),
            children: vec![left, right],
        }
    }

    pub fn leaf(key: Hash, value: Hash) -> Self {
        Self {
            hash: leaf_key(&key, &value),
            children: vec![key, value, Hash::ONE],
        }
    }

    pub fn state(tree_state: &TreeState) -> Self {
        let children = vec![
            tree_state.claims_root(),
            tree_state.revocation_root(),
            tree_state.root_of_roots(),
        ];
        Self {
            hash: poseidon3(&children[0], &children[1], &children[2]),
            children,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.children.as_slice() {
            [_, _] => NodeType::Middle,
            [_, _, third] if *third == Hash::ONE => NodeType::Leaf,
            [_, _, _] => NodeType::State,
            _ => NodeType::Unknown,
        }
    }

    /// Check the arity and that `hash` is the Poseidon hash of the children.
    pub fn validate(&self) -> Result<(), RhsError> {
        let computed = hash_children(&self.children).ok_or_else(|| {
            RhsError::InvalidNode(format!(
                "node {} has {} children",
                self.hash,
                self.children.len()
            ))
        })?;
        if computed != self.hash {
            return Err(RhsError::InvalidNode(format!(
                "node {} does not hash its children (computed {computed})",
                self.hash
            )));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct NodeJson {
    hash: String,
    children: Vec<String>,
}

impl TryFrom<NodeJson> for ProofNode {
    type Error = DomainError;

    fn try_from(json: NodeJson) -> Result<Self, Self::Error> {
        Ok(ProofNode {
            hash: Hash::from_be_hex(&json.hash)?,
            children: json
                .children
                .iter()
                .map(|c| Hash::from_be_hex(c))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<ProofNode> for NodeJson {
    fn from(node: ProofNode) -> Self {
        NodeJson {
            hash: node.hash.to_be_hex(),
            children: node.children.iter().map(Hash::to_be_hex).collect(),
        }
    }
}

pub const STATUS_OK: &str = "OK";

/// Body of `GET /node/{hash}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResponse {
    pub node: ProofNode,
    #[serde(default)]
    pub status: String,
}

/// Body of a successful `POST /node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
