/// fileID 分配器
///
/// 在文件已有 id 集合（对象 id 与所有被引用的 id）之外随机生成新 id。
/// 配置种子时结果可复现，测试依赖这一点。
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 新 id 的下界，避开手写场景中常见的小数字
const MIN_ID: i64 = 1_000_000_000;

#[derive(Debug)]
pub struct IdAllocator {
    used: HashSet<String>,
    rng: StdRng,
}

impl IdAllocator {
    /// 创建分配器
    ///
    /// # 参数
    /// * `used` - 已占用的 id
    /// * `seed` - 随机种子，`None` 时使用系统熵源
    pub fn new<I, S>(used: I, seed: Option<u64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut used: HashSet<String> = used.into_iter().map(Into::into).collect();
        // 空引用永远不可分配
        used.insert("0".to_string());
        Self { used, rng }
    }

    /// 分配一个未使用的 id，并记为已占用
    pub fn allocate(&mut self) -> String {
        loop {
            let candidate = self.rng.random_range(MIN_ID..=i64::MAX).to_string();
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// 一次分配多个 id
    pub fn allocate_many(&mut self, count: usize) -> Vec<String> {
        (0..count).map(|_| self.allocate()).collect()
    }

    /// 标记外部确定的 id 为已占用
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.used.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_unique() {
        let mut alloc = IdAllocator::new(Vec::<String>::new(), Some(7));
        let ids = alloc.allocate_many(200);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 200);
        for id in &ids {
            let n: i64 = id.parse().unwrap();
            assert!(n >= MIN_ID);
            assert!(alloc.contains(id));
        }
    }

    #[test]
    fn test_seeded_allocation_is_deterministic() {
        let mut a = IdAllocator::new(["100", "200"], Some(42));
        let mut b = IdAllocator::new(["100", "200"], Some(42));
        assert_eq!(a.allocate_many(5), b.allocate_many(5));
    }

    #[test]
    fn test_skips_used_ids() {
        let mut fresh = IdAllocator::new(Vec::<String>::new(), Some(3));
        let first = fresh.allocate();

        let mut alloc = IdAllocator::new([first.clone()], Some(3));
        let next = alloc.allocate();
        assert_ne!(next, first);
    }

    #[test]
    fn test_zero_is_reserved() {
        let alloc = IdAllocator::new(Vec::<String>::new(), None);
        assert!(alloc.contains("0"));
    }
}
