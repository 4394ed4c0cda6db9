use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

const SOURCE: &str = r#"
try {
    set $x = call nope
} catch $e {
    print "caught"
}
"#;

#[test]
fn catch_recovers_from_a_reference_error_and_the_run_still_succeeds() {
    let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
    let outcome = engine.run(SOURCE, RunOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["caught".to_owned()]);
}
