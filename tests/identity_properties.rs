// tests/identity_properties.rs

use proptest::prelude::*;

use tart_executor::env::{
    CONCURRENT_ID_VAR, JOB_ID_VAR, JobEnvironment, PROJECT_ID_VAR, RUNNER_ID_VAR, vm_identity,
};

// Runner-assigned ids are numeric or short slugs; never contain '-'.
fn component() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

fn ids() -> impl Strategy<Value = (Option<String>, String, String, String)> {
    (
        proptest::option::of(component()),
        component(),
        component(),
        component(),
    )
}

fn identity(ids: &(Option<String>, String, String, String)) -> String {
    vm_identity(
        ids.0.as_deref(),
        Some(&ids.1),
        Some(&ids.2),
        Some(&ids.3),
    )
}

proptest! {
    #[test]
    fn identity_is_stable_across_hooks(ids in ids()) {
        let (runner, project, slot, job) = ids.clone();
        let mut vars = vec![
            (PROJECT_ID_VAR, project),
            (CONCURRENT_ID_VAR, slot),
            (JOB_ID_VAR, job),
        ];
        if let Some(runner) = runner {
            vars.push((RUNNER_ID_VAR, runner));
        }

        let prepare = JobEnvironment::from_vars(vars.clone()).vm_identity();
        let cleanup = JobEnvironment::from_vars(vars.into_iter().rev()).vm_identity();

        prop_assert_eq!(&prepare, &cleanup);
        prop_assert_eq!(prepare, identity(&ids));
    }

    #[test]
    fn distinct_jobs_get_distinct_vms(a in ids(), b in ids()) {
        prop_assume!(a != b);
        prop_assert_ne!(identity(&a), identity(&b));
    }

    #[test]
    fn identity_has_fixed_shape(ids in ids()) {
        let name = identity(&ids);
        let parts: Vec<&str> = name.split('-').collect();
        let offset = usize::from(ids.0.is_some());

        prop_assert_eq!(parts[0], "runner");
        prop_assert_eq!(parts[2 + offset], "concurrent");
        prop_assert_eq!(parts[4 + offset], "job");
        prop_assert_eq!(parts.len(), 6 + offset);
    }
}

#[test]
fn documented_example() {
    assert_eq!(
        vm_identity(None, Some("p1"), Some("c0"), Some("42")),
        "runner-p1-concurrent-c0-job-42"
    );
}
