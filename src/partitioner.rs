/// Maps a partition key to one of `partitions` workers. Must be stable for the lifetime of a
/// driver so every item of a key reaches the same worker.
pub trait Partitioner {
    fn partition(&self, key: &str, partitions: usize) -> usize;
}

pub struct Md5Partitioner;

impl Partitioner for Md5Partitioner {
    fn partition(&self, key: &str, partitions: usize) -> usize {
        let hash = md5::compute(key);
        let int_from_hash = u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]);
        (int_from_hash as u64 % partitions as u64) as usize
    }
}
