use std::{
    net::SocketAddr,
    sync::Arc,
};

use iden3_proofs::{
    adapters::{
        http_rhs::HttpRhsClient,
        memory_rhs::InMemoryNodeStore,
        sparse_merkle_tree::SparseMerkleTree,
    },
    ports::{
        MerkleTreeReader,
        NodeStore,
        RhsError,
    },
    rhs::{
        publish_identity_state,
        IdentityTrees,
        NodesBuilder,
        ProofNode,
        RhsResolver,
    },
    server,
    Hash,
    TreeState,
};

fn h(v: u64) -> Hash {
    Hash::from_u64(v)
}

async fn spawn() -> (tokio::task::JoinHandle<()>, String) {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let (handle, bound) = server::start_server(Arc::new(InMemoryNodeStore::new()), addr)
        .await
        .expect("server should start");
    (handle, format!("http://{bound}"))
}

#[tokio::test]
async fn publish_and_resolve_over_http() {
    let (handle, base_url) = spawn().await;
    let client = HttpRhsClient::with_client(reqwest::Client::new(), &base_url);

    let mut tree = SparseMerkleTree::new(32);
    for k in [3u64, 6, 9, 12, 15] {
        tree.add(h(k), h(k + 100)).unwrap();
    }
    let mut builder = NodesBuilder::new();
    for k in [3u64, 6, 9, 12, 15] {
        builder.add_key(&tree, &h(k)).unwrap();
    }
    builder.publish(&client).await.unwrap();

    let resolver = RhsResolver::new(client);
    let root = tree.root();
    for k in [3u64, 6, 9, 12, 15] {
        let proof = resolver.generate_proof(&root, &h(k)).await.unwrap();
        assert!(proof.existence());
        assert_eq!(proof, tree.generate_proof(&h(k), &root).unwrap());
    }
    let proof = resolver.generate_proof(&root, &h(4)).await.unwrap();
    assert!(!proof.existence());
    assert!(proof.verify(&root, &h(4), &Hash::ZERO));

    handle.abort();
}

#[tokio::test]
async fn revocation_status_over_http() {
    let (handle, base_url) = spawn().await;
    let client = HttpRhsClient::with_client(reqwest::Client::new(), &base_url);

    let mut claims = SparseMerkleTree::new(32);
    claims.add(h(1), h(2)).unwrap();
    let mut revocations = SparseMerkleTree::new(32);
    revocations.add(h(10), Hash::ZERO).unwrap();
    revocations.add(h(11), Hash::ZERO).unwrap();
    let mut roots = SparseMerkleTree::new(32);
    roots.add(claims.root(), Hash::ZERO).unwrap();
    let state = TreeState::new(claims.root(), revocations.root(), roots.root());

    let trees = IdentityTrees {
        claims: &claims,
        revocations: &revocations,
        roots: &roots,
    };
    publish_identity_state(&client, &state, trees, &[10, 11])
        .await
        .unwrap();

    let resolver = RhsResolver::new(client);
    assert_eq!(resolver.tree_state(&state.state()).await.unwrap(), state);

    let revoked = resolver.revocation_status(&state.state(), 10).await.unwrap();
    assert!(revoked.mtp.existence());
    assert_eq!(revoked.issuer, state);

    let valid = resolver.revocation_status(&state.state(), 12).await.unwrap();
    assert!(!valid.mtp.existence());
    assert!(valid
        .mtp
        .verify(&state.revocation_root(), &h(12), &Hash::ZERO));

    handle.abort();
}

#[tokio::test]
async fn server_error_mapping() {
    let (handle, base_url) = spawn().await;
    let client = HttpRhsClient::with_client(reqwest::Client::new(), &base_url);

    let err = client.get_node(&h(77)).await.unwrap_err();
    assert!(matches!(err, RhsError::NodeNotFound(_)));

    let forged = ProofNode {
        hash: h(1),
        children: vec![h(2), h(3)],
    };
    let err = client.save_nodes(&[forged]).await.unwrap_err();
    assert!(matches!(err, RhsError::HttpStatus { status: 400, .. }));
    assert!(!err.to_string().is_empty());

    let raw = reqwest::Client::new();
    let resp = raw
        .get(format!("{base_url}/node/not-hex"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = raw
        .post(format!("{base_url}/node"))
        .header("content-type", "application/json")
        .body(r#"[{"hash": "zz", "children": []}]"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let node = ProofNode::middle(h(5), h(6));
    client.save_nodes(&[node.clone()]).await.unwrap();
    let resp = raw
        .get(format!("{base_url}/node/{}", node.hash.to_be_hex()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["node"]["children"][1], h(6).to_be_hex());

    handle.abort();
}
