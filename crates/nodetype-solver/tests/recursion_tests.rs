use super::*;

#[test]
fn test_enter_and_leave() {
    let mut guard: RecursionGuard<&str> = RecursionGuard::new(4, 100);
    assert_eq!(guard.enter("a"), RecursionResult::Entered);
    assert_eq!(guard.enter("b"), RecursionResult::Entered);
    assert_eq!(guard.depth(), 2);

    guard.leave(&"b");
    guard.leave(&"a");
    assert_eq!(guard.depth(), 0);
    // Leaving clears the visit, so the same key can be entered again.
    assert_eq!(guard.enter("a"), RecursionResult::Entered);
    guard.leave(&"a");
}

#[test]
fn test_cycle_detected() {
    let mut guard: RecursionGuard<String> = RecursionGuard::new(4, 100);
    assert_eq!(guard.enter("a".to_string()), RecursionResult::Entered);
    assert_eq!(guard.enter("a".to_string()), RecursionResult::Cycle);
    assert_eq!(guard.depth(), 1);
    guard.leave(&"a".to_string());
}

#[test]
fn test_depth_exceeded() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(2, 100);
    assert_eq!(guard.enter(1), RecursionResult::Entered);
    assert_eq!(guard.enter(2), RecursionResult::Entered);
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    guard.leave(&2);
    guard.leave(&1);
}

#[test]
fn test_iterations_exceeded() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 3);
    for key in 0..3 {
        assert_eq!(guard.enter(key), RecursionResult::Entered);
        guard.leave(&key);
    }
    assert_eq!(guard.enter(99), RecursionResult::IterationExceeded);
}

#[test]
fn test_profiles() {
    let profile = RecursionProfile::SupertypeResolution;
    assert_eq!(profile.max_depth(), MAX_SUPERTYPE_DEPTH);
    assert_eq!(profile.max_iterations(), MAX_SUPERTYPE_VISITS);

    let custom = RecursionProfile::Custom {
        max_depth: 1,
        max_iterations: 5,
    };
    let mut guard: RecursionGuard<u8> = RecursionGuard::with_profile(custom);
    assert_eq!(guard.enter(0), RecursionResult::Entered);
    assert_eq!(guard.enter(1), RecursionResult::DepthExceeded);
    guard.leave(&0);
}
