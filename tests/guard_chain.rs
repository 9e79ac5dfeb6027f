//! End-to-end guard chain behaviour on isolated scopes

use mini_apps_guard::{
    CallSite, Environment, FixedEnvironment, GuardContext, GuardErrorKind, GuardedFn,
    MountSignal, Scope, Version, VersionRequirement,
};

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn bar_foo(mounted: &MountSignal) -> GuardContext {
    GuardContext::versioned(
        CallSite::method("Bar", "foo"),
        VersionRequirement::new(v("6.1")).with_mount_signal(mounted.clone()),
    )
}

#[test]
fn test_bar_foo_scenario() {
    let scope = Scope::new(FixedEnvironment(Environment::UnknownBrowser));
    let mounted = MountSignal::new();
    let ctx = bar_foo(&mounted);

    let err = scope.evaluate(&ctx).unwrap_err();
    assert_eq!(err.kind(), GuardErrorKind::UnknownEnv);
    assert_eq!(
        err.to_string(),
        "Unable to call the Bar.foo() method: it can't be called outside Mini Apps"
    );

    scope.set_environment(Environment::MiniApp);
    let err = scope.evaluate(&ctx).unwrap_err();
    assert_eq!(err.kind(), GuardErrorKind::NotInitialized);
    assert_eq!(
        err.to_string(),
        "Unable to call the Bar.foo() method: the SDK was not initialized. Use the SDK init() function"
    );

    scope.init(v("6.0"));
    let err = scope.evaluate(&ctx).unwrap_err();
    assert_eq!(err.kind(), GuardErrorKind::NotSupported);
    assert!(err.message().ends_with("it is unsupported in Mini Apps version 6.0"));

    scope.init(v("6.1"));
    let err = scope.evaluate(&ctx).unwrap_err();
    assert_eq!(err.kind(), GuardErrorKind::NotMounted);
    assert_eq!(
        err.to_string(),
        "Unable to call the Bar.foo() method: the component is not mounted. Use the Bar.mount() method"
    );

    mounted.mount();
    assert!(scope.evaluate(&ctx).is_ok());
}

#[test]
fn test_outside_mini_apps_wins_over_every_state() {
    let versions = [None, Some("5.0"), Some("6.1"), Some("10")];
    for env in [Environment::Server, Environment::UnknownBrowser] {
        for version in versions {
            for is_mounted in [false, true] {
                let scope = Scope::new(FixedEnvironment(env));
                if let Some(version) = version {
                    scope.init(v(version));
                }
                let mounted = MountSignal::new();
                mounted.set(is_mounted);

                let basic = GuardContext::basic(CallSite::function("init"));
                assert_eq!(scope.evaluate(&basic).unwrap_err().kind(), GuardErrorKind::UnknownEnv);
                assert_eq!(
                    scope.evaluate(&bar_foo(&mounted)).unwrap_err().kind(),
                    GuardErrorKind::UnknownEnv
                );
            }
        }
    }
}

#[test]
fn test_uninitialized_inside_mini_apps() {
    let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
    let mounted = MountSignal::new();
    mounted.mount();
    assert_eq!(
        scope.evaluate(&bar_foo(&mounted)).unwrap_err().kind(),
        GuardErrorKind::NotInitialized
    );
    assert_eq!(
        scope
            .evaluate(&GuardContext::basic(CallSite::function("init")))
            .unwrap_err()
            .message(),
        "Unable to call the init() function: the SDK was not initialized. Use the SDK init() function"
    );
}

#[test]
fn test_version_check_is_numeric() {
    let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
    let ctx = GuardContext::versioned(CallSite::function("f"), VersionRequirement::new(v("6.1")));

    scope.init(v("6.0"));
    assert_eq!(scope.evaluate(&ctx).unwrap_err().kind(), GuardErrorKind::NotSupported);

    scope.init(v("6.1"));
    assert!(scope.evaluate(&ctx).is_ok());

    scope.init(v("10"));
    assert!(scope.evaluate(&ctx).is_ok());
}

#[test]
fn test_is_supported_agrees_with_version_step() {
    let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
    let samples = ["0.0", "5.99", "6", "6.0", "6.1", "6.2", "6.10", "7", "10", "10.5"];
    for min in samples {
        let ctx = GuardContext::versioned(CallSite::function("f"), VersionRequirement::new(v(min)));
        for current in samples {
            scope.init(v(current));
            let guard_ok = scope.evaluate(&ctx).is_ok();
            assert_eq!(scope.is_supported(&v(min)), guard_ok, "current {current}, min {min}");
        }
    }
}

#[test]
fn test_is_supported_ignores_mount_state() {
    let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
    let mounted = MountSignal::new();
    let f = GuardedFn::new(bar_foo(&mounted), |_: ()| ()).in_scope(&scope);

    assert_eq!(f.is_supported(), Some(false));
    scope.init(v("6.0"));
    assert_eq!(f.is_supported(), Some(false));
    scope.init(v("6.1"));
    assert_eq!(f.is_supported(), Some(true));
    scope.init(v("10"));
    assert_eq!(f.is_supported(), Some(true));
    assert!(!mounted.get());
}

#[test]
fn test_unmount_reinstates_not_mounted() {
    let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
    scope.init(v("7.0"));
    let mounted = MountSignal::new();
    let ctx = bar_foo(&mounted);

    mounted.mount();
    assert!(scope.evaluate(&ctx).is_ok());
    mounted.unmount();
    assert_eq!(scope.evaluate(&ctx).unwrap_err().kind(), GuardErrorKind::NotMounted);
}

#[test]
fn test_components_have_independent_mount_state() {
    let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
    scope.init(v("7.0"));
    let back = MountSignal::new();
    let main = MountSignal::new();
    let show_back = GuardContext::versioned(
        CallSite::method("BackButton", "show"),
        VersionRequirement::new(v("6.1")).with_mount_signal(back.clone()),
    );
    let show_main = GuardContext::versioned(
        CallSite::method("MainButton", "show"),
        VersionRequirement::new(v("6.1")).with_mount_signal(main.clone()),
    );

    back.mount();
    assert!(scope.evaluate(&show_back).is_ok());
    let err = scope.evaluate(&show_main).unwrap_err();
    assert!(err.message().ends_with("Use the MainButton.mount() method"));
}
