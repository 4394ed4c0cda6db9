use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

#[test]
fn sort_builtin_orders_a_numeric_array_ascending() {
    let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
    let outcome = engine.run("set $arr = [3,1,2]\nprint call sort $arr", RunOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["[1,2,3]".to_owned()]);
}
