use ark_bn254::Fr;
use light_poseidon::{
    Poseidon,
    PoseidonHasher,
};

use crate::domain::hash::Hash;

fn hash_fields(inputs: &[Fr]) -> Hash {
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .expect("Failed to create Poseidon hasher");
    let result = hasher
        .hash(inputs)
        .expect("Failed to compute Poseidon hash");
    Hash::from_fr(result)
}

/// Poseidon hash with 2 inputs.
/// Used for: middle node = poseidon2(left, right)
pub fn poseidon2(a: &Hash, b: &Hash) -> Hash {
    hash_fields(&[a.to_fr(), b.to_fr()])
}

/// Poseidon hash with 3 inputs.
/// Used for:
/// - leaf node = poseidon3(key, value, 1)
/// - identity state = poseidon3(claims_root, revocation_root, root_of_roots)
pub fn poseidon3(a: &Hash, b: &Hash, c: &Hash) -> Hash {
    hash_fields(&[a.to_fr(), b.to_fr(), c.to_fr()])
}

/// Poseidon hash with 4 inputs (claim index and value halves).
pub fn poseidon4(a: &Hash, b: &Hash, c: &Hash, d: &Hash) -> Hash {
    hash_fields(&[a.to_fr(), b.to_fr(), c.to_fr(), d.to_fr()])
}

/// Poseidon over two or three node children, the only arities a tree node has.
pub(crate) fn hash_children(children: &[Hash]) -> Option<Hash> {
    match children {
        [l, r] => Some(poseidon2(l, r)),
        [a, b, c] => Some(poseidon3(a, b, c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poseidon2_deterministic() {
        let a = Hash::from_u64(1);
        let b = Hash::from_u64(2);
        assert_eq!(poseidon2(&a, &b), poseidon2(&a, &b));
    }

    #[test]
    fn test_poseidon2_order_matters() {
        let a = Hash::from_u64(1);
        let b = Hash::from_u64(2);
        assert_ne!(poseidon2(&a, &b), poseidon2(&b, &a));
    }

    #[test]
    fn test_poseidon2_circom_vector() {
        // circomlibjs poseidon([1, 2])
        let expected: Hash =
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
                .parse()
                .unwrap();
        assert_eq!(poseidon2(&Hash::from_u64(1), &Hash::from_u64(2)), expected);
    }

    #[test]
    fn test_poseidon3_differs_from_poseidon2() {
        let a = Hash::from_u64(7);
        let b = Hash::from_u64(8);
        assert_ne!(poseidon2(&a, &b), poseidon3(&a, &b, &Hash::ZERO));
    }

    #[test]
    fn test_hash_children_arity() {
        let h = Hash::from_u64(3);
        assert!(hash_children(&[h]).is_none());
        assert!(hash_children(&[h, h, h, h]).is_none());
        assert_eq!(hash_children(&[h, h]), Some(poseidon2(&h, &h)));
    }
}
