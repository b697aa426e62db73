//! 흐름별 단일 실행 보장.
//!
//! 같은 흐름은 동시에 하나만 실행됩니다. 실행 중에 들어온 트리거는 거부됩니다.

use std::sync::Arc;

use oisync_core::Flow;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 흐름 실행 권한. drop되면 다음 실행이 가능해집니다.
#[derive(Debug)]
pub struct FlowPermit {
    flow: Flow,
    _guard: OwnedMutexGuard<()>,
}

impl FlowPermit {
    pub fn flow(&self) -> Flow {
        self.flow
    }
}

/// 흐름마다 하나의 뮤텍스.
#[derive(Debug, Clone, Default)]
pub struct FlowGuard {
    snapshot: Arc<Mutex<()>>,
    sync_today: Arc<Mutex<()>>,
}

impl FlowGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, flow: Flow) -> &Arc<Mutex<()>> {
        match flow {
            Flow::Snapshot => &self.snapshot,
            Flow::SyncToday => &self.sync_today,
        }
    }

    /// 권한 획득 시도. 이미 실행 중이면 None.
    pub fn try_acquire(&self, flow: Flow) -> Option<FlowPermit> {
        let guard = self.lock(flow).clone().try_lock_owned().ok()?;
        Some(FlowPermit {
            flow,
            _guard: guard,
        })
    }

    /// 흐름이 실행 중인지 확인.
    pub fn is_busy(&self, flow: Flow) -> bool {
        self.lock(flow).try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected_until_drop() {
        let guard = FlowGuard::new();
        let permit = guard.try_acquire(Flow::SyncToday).unwrap();
        assert_eq!(permit.flow(), Flow::SyncToday);
        assert!(guard.try_acquire(Flow::SyncToday).is_none());
        assert!(guard.is_busy(Flow::SyncToday));

        drop(permit);
        assert!(!guard.is_busy(Flow::SyncToday));
        assert!(guard.try_acquire(Flow::SyncToday).is_some());
    }

    #[test]
    fn test_flows_are_independent() {
        let guard = FlowGuard::new();
        let _snapshot = guard.try_acquire(Flow::Snapshot).unwrap();
        assert!(guard.try_acquire(Flow::SyncToday).is_some());
    }

    #[tokio::test]
    async fn test_permit_travels_into_background_task() {
        let guard = FlowGuard::new();
        let permit = guard.try_acquire(Flow::Snapshot).unwrap();
        let clone = guard.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            clone.is_busy(Flow::Snapshot)
        });

        assert!(handle.await.unwrap());
        assert!(!guard.is_busy(Flow::Snapshot));
    }
}
