//! Key Sharding
//!
//! Picks the memcached node that owns a key when several are configured.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Returns the index of the node owning `key` among `nodes` nodes.
///
/// FNV-1a over the key bytes, so the mapping is stable across restarts and
/// across gateway instances sharing the same node list.
pub fn shard_index(key: &str, nodes: usize) -> usize {
    if nodes <= 1 {
        return 0;
    }
    let hash = key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    (hash % nodes as u64) as usize
}
