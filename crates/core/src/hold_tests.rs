use super::*;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct RecordingHold {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail_rollback: bool,
}

#[async_trait]
impl ResourceHold for RecordingHold {
    async fn commit(&mut self) -> Result<(), HoldError> {
        self.log.lock().unwrap().push(format!("commit:{}", self.name));
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), HoldError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("rollback:{}", self.name));
        if self.fail_rollback {
            Err(HoldError::Rollback(self.name.to_string()))
        } else {
            Ok(())
        }
    }
}

fn hold(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn ResourceHold> {
    Box::new(RecordingHold {
        name,
        log: log.clone(),
        fail_rollback: false,
    })
}

fn failing_hold(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn ResourceHold> {
    Box::new(RecordingHold {
        name,
        log: log.clone(),
        fail_rollback: true,
    })
}

#[tokio::test]
async fn normal_exit_no_parent_commits_in_push_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut mgr = TransientResourceManager::new(true);
    mgr.push(hold("a", &log));
    mgr.push(hold("b", &log));

    let outcome = run_scoped::<(), ()>(&mut mgr, None, Ok(())).await;
    assert!(matches!(outcome, ScopedOutcome::Ok(())));
    assert!(mgr.is_empty());
    assert_eq!(*log.lock().unwrap(), vec!["commit:a", "commit:b"]);
}

#[tokio::test]
async fn normal_exit_with_parent_moves_holds_instead_of_committing() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut parent = TransientResourceManager::new(true);
    let mut mgr = TransientResourceManager::new(true);
    mgr.push(hold("a", &log));

    let outcome = run_scoped::<(), ()>(&mut mgr, Some(&mut parent), Ok(())).await;
    assert!(matches!(outcome, ScopedOutcome::Ok(())));
    assert!(mgr.is_empty());
    assert!(!parent.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn critical_error_no_parent_rolls_back_lifo_and_reraises() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut mgr = TransientResourceManager::new(true);
    mgr.push(hold("a", &log));
    mgr.push(hold("b", &log));

    let outcome = run_scoped(&mut mgr, None, Err::<(), &str>("boom")).await;
    assert!(matches!(outcome, ScopedOutcome::Raised("boom")));
    assert_eq!(*log.lock().unwrap(), vec!["rollback:b", "rollback:a"]);
}

#[tokio::test]
async fn critical_error_with_parent_moves_rather_than_rolling_back() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut parent = TransientResourceManager::new(true);
    let mut mgr = TransientResourceManager::new(true);
    mgr.push(hold("a", &log));

    let outcome = run_scoped(&mut mgr, Some(&mut parent), Err::<(), &str>("boom")).await;
    assert!(matches!(outcome, ScopedOutcome::Raised("boom")));
    assert!(log.lock().unwrap().is_empty());
    assert!(!parent.is_empty());
}

#[tokio::test]
async fn noncritical_error_rolls_back_locally_and_swallows() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut mgr = TransientResourceManager::new(false);
    mgr.push(hold("a", &log));

    let outcome = run_scoped(&mut mgr, None, Err::<(), &str>("boom")).await;
    assert!(matches!(outcome, ScopedOutcome::Swallowed));
    assert_eq!(*log.lock().unwrap(), vec!["rollback:a"]);
}

#[tokio::test]
async fn noncritical_error_with_parent_rolls_back_then_moves_survivors() {
    // Simulates a child manager that rolled back its own holds but whose
    // grandchildren had already moved additional holds up before the
    // failure was observed.
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut parent = TransientResourceManager::new(true);
    let mut mgr = TransientResourceManager::new(false);
    mgr.push(hold("own", &log));

    let mut grandchild = TransientResourceManager::new(true);
    grandchild.push(hold("survivor", &log));
    grandchild.move_to(&mut mgr);

    let outcome = run_scoped(&mut mgr, Some(&mut parent), Err::<(), &str>("boom")).await;
    assert!(matches!(outcome, ScopedOutcome::Swallowed));
    // Both "own" and "survivor" were in mgr's stack at rollback time, LIFO.
    assert_eq!(*log.lock().unwrap(), vec!["rollback:survivor", "rollback:own"]);
    assert!(parent.is_empty());
}

#[tokio::test]
async fn rollback_attempts_every_hold_even_if_an_earlier_one_fails() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut mgr = TransientResourceManager::new(true);
    mgr.push(hold("a", &log));
    mgr.push(failing_hold("b", &log));
    mgr.push(hold("c", &log));

    mgr.rollback().await;
    assert_eq!(
        *log.lock().unwrap(),
        vec!["rollback:c", "rollback:b", "rollback:a"]
    );
    assert!(mgr.is_empty());
}
